use crate::models::AppData;
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
    /// Bearer token to user id. Lives only as long as the process.
    pub sessions: Arc<Mutex<HashMap<String, String>>>,
    pub require_auth: bool,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData, require_auth: bool) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            require_auth,
        }
    }
}
