// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for siam-harness
//!
//! Provides an on-disk testbed and recording fakes for the external
//! collaborators of a run.
//!
//! # Design Principles
//! - Every testbed lives in its own temporary directory
//! - No real processes are built, launched or killed
//! - Launcher and barrier write to one shared [`EventLog`], so tests can
//!   assert on the interleaving of launches and the barrier

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use siam_harness::domain::{Endpoint, ServiceKind};
use siam_harness::{
    Barrier, HarnessConfig, HarnessResult, LaunchOrchestrator, LauncherError, ProcessLauncher,
};

/// Template containing every recognized sentinel exactly once
pub const FULL_TEMPLATE: &str = "\
# generated by siam-harness tests
id = \"#ID#\"
ip = \"#IP#\"
port = #PORT#
isd_as = \"#ISD_ID#-#AS_ID#\"
cfg_dir = \"#GEN_PATH#/AS#AS_ID_#\"
db = \"./#DB#\"
quic_addr = \"127.0.0.1:#QUIC_PORT#\"

[sd_client]
address = \"#SD_ADDR#\"
";

/// Identities with a topology descriptor in every testbed, with their SD addresses
pub const TOPOLOGY: [(&str, &str); 3] = [
    ("1-ff00:0:110", "127.0.0.19:30255"),
    ("1-ff00:0:111", "127.0.0.27:30255"),
    ("1-ff00:0:112", "127.0.0.35:30255"),
];

/// Manifest with every kind populated; SIG is listed first on purpose
pub const MANIFEST: &str = r#"{
    "SIG": {
        "sig1": { "ia": "1-ff00:0:111" },
        "sig2": { "ia": "1-ff00:0:112" }
    },
    "PLN": {
        "pln1": { "ia": "1-ff00:0:110" },
        "pln2": { "ia": "1-ff00:0:110" }
    },
    "PGN": {
        "pgn1": { "ia": "1-ff00:0:111" }
    },
    "MS": {
        "ms1": { "ia": "1-ff00:0:110" },
        "ms2": { "ia": "1-ff00:0:112" }
    }
}"#;

/// Something a fake collaborator observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Build,
    Launch {
        kind: ServiceKind,
        instance: String,
        config: PathBuf,
    },
    TerminateAll,
    Barrier {
        endpoints: usize,
    },
}

/// Shared, ordered record of fake collaborator calls
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.lock().expect("event log poisoned").push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().expect("event log poisoned").clone()
    }

    /// Kinds of the recorded launches, in order
    pub fn launched_kinds(&self) -> Vec<ServiceKind> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Launch { kind, .. } => Some(kind),
                _ => None,
            })
            .collect()
    }

    /// Instance names of the recorded launches, in order
    pub fn launched_instances(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Launch { instance, .. } => Some(instance),
                _ => None,
            })
            .collect()
    }
}

/// Launcher that records calls instead of running scripts
#[derive(Debug, Clone, Default)]
pub struct RecordingLauncher {
    log: EventLog,
    fail_build: bool,
    reject_instance: Option<String>,
}

impl RecordingLauncher {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Make `build()` fail like a non-zero build script
    pub fn failing_build(mut self) -> Self {
        self.fail_build = true;
        self
    }

    /// Make `launch()` exit non-zero for one instance
    pub fn failing_launch(mut self, instance: &str) -> Self {
        self.reject_instance = Some(instance.to_string());
        self
    }
}

#[async_trait]
impl ProcessLauncher for RecordingLauncher {
    async fn build(&self) -> Result<(), LauncherError> {
        self.log.push(Event::Build);
        if self.fail_build {
            return Err(LauncherError::NonZeroExit {
                command: "build_all.sh".to_string(),
                code: Some(2),
            });
        }
        Ok(())
    }

    async fn launch(
        &self,
        kind: ServiceKind,
        config_path: &Path,
        instance: &str,
    ) -> Result<(), LauncherError> {
        if self.reject_instance.as_deref() == Some(instance) {
            return Err(LauncherError::NonZeroExit {
                command: format!("r.sh {instance}"),
                code: Some(1),
            });
        }
        self.log.push(Event::Launch {
            kind,
            instance: instance.to_string(),
            config: config_path.to_path_buf(),
        });
        Ok(())
    }

    async fn terminate_all(&self) {
        self.log.push(Event::TerminateAll);
    }

    fn name(&self) -> &str {
        "recording-launcher"
    }
}

/// Barrier that records when it was reached and releases immediately
#[derive(Debug, Clone)]
pub struct RecordingBarrier {
    log: EventLog,
}

impl RecordingBarrier {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

#[async_trait]
impl Barrier for RecordingBarrier {
    async fn wait(&self, launched: &[Endpoint]) -> HarnessResult<()> {
        self.log.push(Event::Barrier {
            endpoints: launched.len(),
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "recording-barrier"
    }
}

/// Working directory with templates plus a generated topology tree
pub struct Testbed {
    dir: TempDir,
    pub config: HarnessConfig,
}

impl Testbed {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let work = dir.path().join("work");
        let topology = dir.path().join("scion/gen");
        let tests = dir.path().join("tests");

        std::fs::create_dir_all(work.join("config")).expect("Failed to create config dir");
        for kind in ServiceKind::ALL {
            std::fs::write(work.join("config").join(kind.template_file_name()), FULL_TEMPLATE)
                .expect("Failed to write template");
        }

        for (ia, sd_address) in TOPOLOGY {
            let (isd, as_id) = ia.split_once('-').expect("Invalid fixture identity");
            let endhost = topology
                .join(format!("ISD{isd}"))
                .join(format!("AS{}", as_id.replace(':', "_")))
                .join("endhost");
            std::fs::create_dir_all(&endhost).expect("Failed to create endhost dir");
            std::fs::write(
                endhost.join("sd.toml"),
                format!("[sd]\naddress = \"{sd_address}\"\n"),
            )
            .expect("Failed to write sd.toml");
        }

        std::fs::create_dir_all(&tests).expect("Failed to create tests dir");
        std::fs::write(tests.join("services.json"), MANIFEST).expect("Failed to write manifest");

        let config = HarnessConfig::new(tests, "services.json", topology, work);
        Self { dir, config }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn gen_dir(&self) -> PathBuf {
        self.config.layout().gen_dir()
    }

    pub fn write_template(&self, kind: ServiceKind, content: &str) {
        std::fs::write(self.config.layout().template_path(kind), content)
            .expect("Failed to write template");
    }

    pub fn remove_template(&self, kind: ServiceKind) {
        std::fs::remove_file(self.config.layout().template_path(kind))
            .expect("Failed to remove template");
    }

    /// Orchestrator wired to recording fakes sharing `log`
    pub fn orchestrator(&self, log: &EventLog) -> LaunchOrchestrator<RecordingLauncher> {
        self.orchestrator_with(RecordingLauncher::new(log.clone()), log)
    }

    pub fn orchestrator_with(
        &self,
        launcher: RecordingLauncher,
        log: &EventLog,
    ) -> LaunchOrchestrator<RecordingLauncher> {
        LaunchOrchestrator::new(&self.config, launcher)
            .with_barrier(Box::new(RecordingBarrier::new(log.clone())))
    }
}
