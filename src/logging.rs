//! Tracing output for the command-line tool and its tests.
//!
//! [`DispatchBuilder`] constructs a stack of tracing `Layer`s. At the top is
//! an [`EnvFilter`] layer that filters events using the `RUST_LOG`
//! environment variable. For example, `RUST_LOG="hornslice=debug,z3=error"`
//! shows which array types were encoded and which were reused. More
//! information can be found in the [`EnvFilter`] documentation.
//!
//! Events are printed to standard error, or to the test writer in tests.
//!
//! [`EnvFilter`]: https://docs.rs/tracing-subscriber/0.3/tracing_subscriber/filter/struct.EnvFilter.html

use std::sync::Once;

use tracing::Dispatch;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: Once = Once::new();

/// Initialize the global tracing dispatcher with the one built by the
/// provided builder. Only the first call has an effect.
pub fn init_tracing(builder: DispatchBuilder) {
    INIT.call_once(|| {
        if let Err(err) = tracing::dispatcher::set_global_default(builder.finish()) {
            eprintln!("could not install tracing subscriber: {}", err);
        }
    });
}

/// A builder to construct the stack of layers we use to process tracing
/// events and spans.
#[derive(Debug, Default)]
pub struct DispatchBuilder {
    json: bool,
}

impl DispatchBuilder {
    /// Enable or disable json output.
    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Create a new `Dispatch`.
    pub fn finish(self) -> Dispatch {
        // The layer types differ between the configurations, so every
        // combination is built separately instead of boxing the layers.
        macro_rules! build_logging_layer {
            () => {{
                let logging_layer;
                cfg_if::cfg_if! {
                    if #[cfg(not(test))] {
                        logging_layer = tracing_subscriber::fmt::layer()
                            .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
                            .with_writer(std::io::stderr);
                    } else {
                        use tracing_subscriber::fmt::format::*;
                        logging_layer = tracing_subscriber::fmt::layer()
                            .with_span_events(FmtSpan::CLOSE)
                            .with_test_writer();
                    }
                }
                let logging_layer2;
                cfg_if::cfg_if! {
                    if #[cfg(not(feature = "log-print-timeless"))] {
                        logging_layer2 = logging_layer;
                    } else {
                        logging_layer2 = logging_layer.without_time();
                    }
                }
                logging_layer2
            }};
        }

        if self.json {
            Dispatch::new(
                EnvFilter::from_default_env().with_subscriber(
                    build_logging_layer!()
                        .json()
                        .with_subscriber(tracing_subscriber::registry()),
                ),
            )
        } else {
            Dispatch::new(EnvFilter::from_default_env().with_subscriber(
                build_logging_layer!().with_subscriber(tracing_subscriber::registry()),
            ))
        }
    }
}
