/// Pipeline stage a progress entry belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Preliminaries,
    Extract,
    Transform,
    LoadCsv,
    Connect,
    LoadDb,
    Query,
    Complete,
    Disconnect,
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Preliminaries => "preliminaries",
            Stage::Extract => "extract",
            Stage::Transform => "transform",
            Stage::LoadCsv => "load_csv",
            Stage::Connect => "connect",
            Stage::LoadDb => "load_db",
            Stage::Query => "query",
            Stage::Complete => "complete",
            Stage::Disconnect => "disconnect",
        }
    }
}
