mod backend;
mod statements;

pub use backend::MysqlBackend;
