use std::io::Write;

/// The process environment a command runs in, abstracted so commands can run under test.
pub trait Host: Send + Sync {
    /// Destination for normal output (e.g., stdout)
    fn output(&mut self) -> impl Write;

    /// Destination for error output (e.g., stderr)
    fn error(&mut self) -> impl Write;

    /// Terminate the process. A test host may only record the request and return.
    fn exit(&mut self, code: i32);
}

/// Host that captures output in memory and records exit requests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct TestHost {
    pub output_buf: Vec<u8>,
    pub error_buf: Vec<u8>,
    pub exit_code: Option<i32>,
}

#[cfg(test)]
impl TestHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).into_owned()
    }

    pub fn error_str(&self) -> String {
        String::from_utf8_lossy(&self.error_buf).into_owned()
    }
}

#[cfg(test)]
impl Host for TestHost {
    fn output(&mut self) -> impl Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl Write {
        &mut self.error_buf
    }

    fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }
}
