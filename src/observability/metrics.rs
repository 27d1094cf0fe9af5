use prometheus::{
    Encoder, GaugeVec, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub fixes_total: IntCounterVec,
    pub fixes_in_queue: IntGauge,
    pub fix_processing_seconds: HistogramVec,
    pub load_progress_percent: GaugeVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let fixes_total = IntCounterVec::new(
            Opts::new("fixes_total", "Total processed gps fixes by outcome"),
            &["outcome"],
        )
        .expect("valid fixes_total metric");

        let fixes_in_queue = IntGauge::new("fixes_in_queue", "Current number of fixes in queue")
            .expect("valid fixes_in_queue metric");

        let fix_processing_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "fix_processing_seconds",
                "Latency of fix processing in seconds",
            ),
            &["outcome"],
        )
        .expect("valid fix_processing_seconds metric");

        let load_progress_percent = GaugeVec::new(
            Opts::new(
                "load_progress_percent",
                "Percent of route distance covered per load [0..100]",
            ),
            &["load_id"],
        )
        .expect("valid load_progress_percent metric");

        registry
            .register(Box::new(fixes_total.clone()))
            .expect("register fixes_total");
        registry
            .register(Box::new(fixes_in_queue.clone()))
            .expect("register fixes_in_queue");
        registry
            .register(Box::new(fix_processing_seconds.clone()))
            .expect("register fix_processing_seconds");
        registry
            .register(Box::new(load_progress_percent.clone()))
            .expect("register load_progress_percent");

        Self {
            registry,
            fixes_total,
            fixes_in_queue,
            fix_processing_seconds,
            load_progress_percent,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
