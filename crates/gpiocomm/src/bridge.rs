use std::time::Duration;

use gpiocomm_frame::{FrameHandler, FramerConfig, OverflowPolicy};
use gpiocomm_host::{FileStore, HostConfig, HostDispatcher, HttpScoreService, MemoryStore, Session};
use tokio::runtime::Runtime;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::cmd::{OverflowArg, SessionArgs};
use crate::exit::{host_error, io_error, CliResult};
use crate::output::Exchange;

/// A host session wired to the score service and the state file.
pub struct Bridge {
    runtime: Runtime,
    session: Session,
    tasks: TaskTracker,
    request_timeout: Duration,
}

impl Bridge {
    pub fn open(args: &SessionArgs) -> CliResult<Self> {
        let request_timeout = args.request_timeout()?;
        let config = HostConfig {
            service_root: args.service_root.clone(),
            request_timeout,
            ..HostConfig::default()
        };

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|err| io_error("failed starting runtime", err))?;
        let service = HttpScoreService::new(&config)
            .map_err(|err| host_error("failed building score client", err))?;

        let dispatcher = match &args.state_file {
            Some(path) => {
                let store = FileStore::open(path).map_err(|err| {
                    host_error(&format!("failed opening {}", path.display()), err)
                })?;
                HostDispatcher::new(config, store, service, runtime.handle().clone())
            }
            None => {
                debug!("no state file, replay and host id are not persisted");
                HostDispatcher::new(config, MemoryStore::new(), service, runtime.handle().clone())
            }
        };
        let tasks = dispatcher.tasks();

        let framer_config = FramerConfig {
            overflow: match args.overflow {
                OverflowArg::Clamp => OverflowPolicy::Clamp,
                OverflowArg::Reject => OverflowPolicy::Reject,
            },
        };
        let handler: Box<dyn FrameHandler> = Box::new(dispatcher);
        let session = Session::with_handlers(framer_config, vec![handler]);

        Ok(Self {
            runtime,
            session,
            tasks,
            request_timeout,
        })
    }

    /// Write one message the way the cart does and read back the response.
    pub fn exchange(&mut self, request: &[u8]) -> CliResult<Exchange> {
        let response = self
            .session
            .exchange(request)
            .map_err(|err| host_error("exchange failed", err))?;
        Ok(Exchange {
            request: request.to_vec(),
            response: response.to_vec(),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Let in-flight uploads and fetches finish, bounded by the request timeout.
    pub fn finish(self) {
        let Self {
            runtime,
            tasks,
            request_timeout,
            ..
        } = self;
        tasks.close();
        if tasks.is_empty() {
            return;
        }

        debug!(pending = tasks.len(), "waiting for background requests");
        let finished = runtime.block_on(async {
            tokio::time::timeout(request_timeout, tasks.wait()).await.is_ok()
        });
        if !finished {
            warn!(pending = tasks.len(), "background requests still running at exit");
        }
    }
}
