//! Interactive HTTP probe harness.
//!
//! Fires requests against a target server and renders each outcome (text,
//! image, HTTP error or network error) into a presentation. A batch launches
//! every request at once; each result slot is finalized independently, in
//! whatever order the responses arrive, while the display keeps launch order.
//!
//! ```ignore
//! let client = Arc::new(ReqwestHttpClient::from_config(&config)?);
//! let board = Arc::new(SlotBoard::new());
//! let dispatcher = BatchDispatcher::new(client, board.clone());
//! dispatcher.launch_batch(config.demo_batch.clone());
//! dispatcher.wait_idle().await;
//! ```

pub mod classify;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod error;
pub mod executor;
pub mod http;
pub mod metrics;
pub mod presentation;
pub mod render;
pub mod single;

// Re-export commonly used types
pub use classify::{BodyMode, classify};
pub use config::HarnessConfig;
pub use dispatcher::{BatchDispatcher, BatchLaunch, DispatcherStats};
pub use domain::content::{ImageHandle, RenderedContent};
pub use domain::descriptor::{Generation, RequestDescriptor, SlotId};
pub use domain::slot::{AnySlot, ResultSlot, SlotCompletion, SlotStateFilter};
pub use error::{Result, VolleyError};
pub use executor::RequestKind;
pub use http::{HttpClient, HttpResponse, MockHttpClient, ReqwestHttpClient};
pub use presentation::{BoardEvent, Presentation, SlotBoard, SlotHandle, SlotUpdate};
pub use single::SingleShot;
