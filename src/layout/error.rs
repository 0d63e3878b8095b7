#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("dependency cycle among tasks: {}", .tasks.join(", "))]
    Cycle { tasks: Vec<String> },
}

pub type Result<T> = std::result::Result<T, LayoutError>;
