use std::fmt;

#[derive(Debug, Clone)]
pub enum VidgateError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    DateParse(String),
}

impl VidgateError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            VidgateError::DatabaseConfig(_) => "E001",
            VidgateError::DatabaseConnection(_) => "E002",
            VidgateError::DatabaseOperation(_) => "E003",
            VidgateError::FileOperation(_) => "E004",
            VidgateError::Validation(_) => "E005",
            VidgateError::NotFound(_) => "E006",
            VidgateError::Serialization(_) => "E007",
            VidgateError::DateParse(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            VidgateError::DatabaseConfig(_) => "Database Configuration Error",
            VidgateError::DatabaseConnection(_) => "Database Connection Error",
            VidgateError::DatabaseOperation(_) => "Database Operation Error",
            VidgateError::FileOperation(_) => "File Operation Error",
            VidgateError::Validation(_) => "Validation Error",
            VidgateError::NotFound(_) => "Resource Not Found",
            VidgateError::Serialization(_) => "Serialization Error",
            VidgateError::DateParse(_) => "Date Parse Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            VidgateError::DatabaseConfig(msg) => msg,
            VidgateError::DatabaseConnection(msg) => msg,
            VidgateError::DatabaseOperation(msg) => msg,
            VidgateError::FileOperation(msg) => msg,
            VidgateError::Validation(msg) => msg,
            VidgateError::NotFound(msg) => msg,
            VidgateError::Serialization(msg) => msg,
            VidgateError::DateParse(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for VidgateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 默认使用简洁格式
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for VidgateError {}

// 便捷的构造函数
impl VidgateError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        VidgateError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        VidgateError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        VidgateError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        VidgateError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        VidgateError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        VidgateError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        VidgateError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        VidgateError::DateParse(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for VidgateError {
    fn from(err: sea_orm::DbErr) -> Self {
        VidgateError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for VidgateError {
    fn from(err: std::io::Error) -> Self {
        VidgateError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for VidgateError {
    fn from(err: serde_json::Error) -> Self {
        VidgateError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for VidgateError {
    fn from(err: chrono::ParseError) -> Self {
        VidgateError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VidgateError>;
