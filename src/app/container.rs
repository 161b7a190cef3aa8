use std::sync::Arc;

use crate::adapters::{AppConfig, FFmpegAdapter, FFprobeAdapter, FsSessionAdapter};
use crate::app::{BatchInteractor, SessionInteractor, UploadInteractor};
use crate::domain::rules::UploadLimits;
use crate::ports::{ExecutePort, ProbePort, SessionPort};

pub trait AppContainer: Send + Sync {
    fn upload_interactor(&self) -> Arc<UploadInteractor>;
    fn batch_interactor(&self) -> Arc<BatchInteractor>;
    fn session_interactor(&self) -> Arc<SessionInteractor>;
    fn probe_port(&self) -> Arc<dyn ProbePort>;
}

pub struct DefaultAppContainer {
    upload_interactor: Arc<UploadInteractor>,
    batch_interactor: Arc<BatchInteractor>,
    session_interactor: Arc<SessionInteractor>,
    probe_port: Arc<dyn ProbePort>,
}

impl DefaultAppContainer {
    /// Wire the ffmpeg-backed adapters described by `config`
    pub fn new(config: &AppConfig) -> Self {
        let probe_port = Arc::new(
            FFprobeAdapter::new(config.ffprobe_path.clone()).with_timeout(config.file_timeout()),
        );
        let execute_port = Arc::new(
            FFmpegAdapter::new(
                config.ffmpeg_path.clone(),
                config.policy,
                config.encoder_settings(),
            )
            .with_timeout(config.file_timeout()),
        );
        let session_port = Arc::new(FsSessionAdapter::new(config.storage_root.clone()));

        Self::with_ports(
            probe_port,
            execute_port,
            session_port,
            config.upload_limits(),
        )
    }

    /// Wire interactors around caller-supplied ports
    pub fn with_ports(
        probe_port: Arc<dyn ProbePort>,
        execute_port: Arc<dyn ExecutePort>,
        session_port: Arc<dyn SessionPort>,
        limits: UploadLimits,
    ) -> Self {
        let upload_interactor = Arc::new(UploadInteractor::new(
            Arc::clone(&session_port),
            limits,
        ));

        let batch_interactor = Arc::new(BatchInteractor::new(
            Arc::clone(&probe_port),
            execute_port,
            Arc::clone(&session_port),
        ));

        let session_interactor = Arc::new(SessionInteractor::new(session_port));

        Self {
            upload_interactor,
            batch_interactor,
            session_interactor,
            probe_port,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn upload_interactor(&self) -> Arc<UploadInteractor> {
        Arc::clone(&self.upload_interactor)
    }

    fn batch_interactor(&self) -> Arc<BatchInteractor> {
        Arc::clone(&self.batch_interactor)
    }

    fn session_interactor(&self) -> Arc<SessionInteractor> {
        Arc::clone(&self.session_interactor)
    }

    fn probe_port(&self) -> Arc<dyn ProbePort> {
        Arc::clone(&self.probe_port)
    }
}
