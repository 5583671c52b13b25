/// Fire-and-forget asynchronous function invocation.
///
/// The submission is acknowledged or it fails; no response payload is ever
/// awaited and no retry happens here. Redelivery is the invoking trigger's
/// concern.
pub trait ExecutionDispatcher {
    fn invoke_async(&self, function_name: &str, payload: &[u8]) -> Result<(), String>;
}
