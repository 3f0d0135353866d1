use super::source::{DiagnosticSource, SourceError};
use super::{RawDiagnostic, ResolvedConfig};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

type CheckHook = Box<dyn Fn(&ResolvedConfig) + Send + Sync>;

/// Scripted diagnostic source. Responses are matched by the unit directory
/// suffix; units without a script report nothing.
pub struct MockDiagnosticSource {
    scripts: Mutex<Vec<(PathBuf, MockResponse)>>,
    checked: Mutex<Vec<PathBuf>>,
    on_check: Option<CheckHook>,
}

#[derive(Debug, Clone)]
pub enum MockResponse {
    Diagnostics(Vec<RawDiagnostic>),
    Error(String),
    Panic(String),
}

impl MockResponse {
    pub fn diagnostics(diagnostics: impl IntoIterator<Item = RawDiagnostic>) -> Self {
        MockResponse::Diagnostics(diagnostics.into_iter().collect())
    }

    pub fn error(message: impl Into<String>) -> Self {
        MockResponse::Error(message.into())
    }

    pub fn panic(message: impl Into<String>) -> Self {
        MockResponse::Panic(message.into())
    }
}

impl MockDiagnosticSource {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(Vec::new()),
            checked: Mutex::new(Vec::new()),
            on_check: None,
        }
    }

    /// Run `hook` at the start of every check, before the scripted response
    pub fn with_hook(mut self, hook: impl Fn(&ResolvedConfig) + Send + Sync + 'static) -> Self {
        self.on_check = Some(Box::new(hook));
        self
    }

    /// Script the response for units whose directory ends with `unit`
    pub fn add_response(&self, unit: impl Into<PathBuf>, response: MockResponse) {
        self.scripts.lock().unwrap().push((unit.into(), response));
    }

    /// Unit directories checked so far, in call order
    pub fn checked_units(&self) -> Vec<PathBuf> {
        self.checked.lock().unwrap().clone()
    }

    fn response_for(&self, unit_dir: &Path) -> Option<MockResponse> {
        self.scripts
            .lock()
            .unwrap()
            .iter()
            .find(|(unit, _)| unit_dir.ends_with(unit))
            .map(|(_, response)| response.clone())
    }
}

impl Default for MockDiagnosticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticSource for MockDiagnosticSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn check(&self, config: &ResolvedConfig) -> Result<Vec<RawDiagnostic>, SourceError> {
        self.checked.lock().unwrap().push(config.project_dir.clone());
        if let Some(hook) = &self.on_check {
            hook(config);
        }

        match self.response_for(&config.project_dir) {
            None => Ok(Vec::new()),
            Some(MockResponse::Diagnostics(diagnostics)) => Ok(diagnostics),
            Some(MockResponse::Error(message)) => Err(SourceError::Engine(message)),
            Some(MockResponse::Panic(message)) => panic!("{}", message),
        }
    }
}
