pub mod absorption;
pub mod fit_inputs;
pub mod grey_disc;
pub mod jobs;
pub mod pmt_response;
pub mod serialization;

mod traits;

pub use traits::ToolExecutor;
