use crate::domain::ComputeResult;

/// One calibration tool: consumes a request, writes its artifacts and reports
/// what it computed.
pub trait ToolExecutor {
    type Request;
    type Report;

    fn execute(&self, request: &Self::Request) -> ComputeResult<Self::Report>;
}
