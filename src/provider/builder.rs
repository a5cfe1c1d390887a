use std::sync::Arc;

use crate::{
    client::ControlRef,
    provider::{MonitorConfig, ProviderService},
    sinks::{LogSink, SinkRef},
};

/// Builder for constructing a [`ProviderService`] with optional settings.
pub struct ProviderServiceBuilder {
    control: ControlRef,
    cfg: MonitorConfig,
    sink: SinkRef,
}

impl ProviderServiceBuilder {
    /// Creates a new builder around the daemon controller.
    ///
    /// Defaults: [`MonitorConfig::default`] and a [`LogSink`].
    pub fn new(control: ControlRef) -> Self {
        Self {
            control,
            cfg: MonitorConfig::default(),
            sink: Arc::new(LogSink),
        }
    }

    /// Overrides the monitor configuration.
    pub fn with_config(mut self, cfg: MonitorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the sink receiving failed polls and panicking subscribers.
    pub fn with_sink(mut self, sink: SinkRef) -> Self {
        self.sink = sink;
        self
    }

    /// Builds the monitor in the `NotRunning` state with no service adopted.
    pub fn build(self) -> ProviderService {
        ProviderService::new_internal(self.control, self.cfg, self.sink)
    }
}
