use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 5000, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
    #[serde(default = "default_true")]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
            auto_migrate: true,
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_true() -> bool { true }

/// 媒体存储后端
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaBackend {
    Cloudinary,
    #[default]
    Local,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MediaConfig {
    #[serde(default)]
    pub backend: MediaBackend,
    #[serde(default)]
    pub cloudinary: CloudinaryConfig,
    #[serde(default)]
    pub local: LocalMediaConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudinaryConfig {
    #[serde(default)]
    pub cloud_name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default = "default_folder")]
    pub folder: String,
    #[serde(default = "default_media_timeout")]
    pub timeout_secs: u64,
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: default_folder(),
            timeout_secs: default_media_timeout(),
        }
    }
}

fn default_folder() -> String { "wallpapers".into() }
fn default_media_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct LocalMediaConfig {
    #[serde(default = "default_media_dir")]
    pub dir: String,
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl Default for LocalMediaConfig {
    fn default() -> Self {
        Self { dir: default_media_dir(), public_base_url: default_public_base_url() }
    }
}

fn default_media_dir() -> String { "data/media".into() }
fn default_public_base_url() -> String { "/media".into() }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 共享密钥（开发环境）
    #[serde(default)]
    pub jwt_secret: Option<String>,
    /// RS256 公钥（PEM），身份提供方导出的 JWT 验签公钥
    #[serde(default)]
    pub jwt_public_key_pem: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: None, jwt_public_key_pem: None, issuer: None, leeway_secs: default_leeway() }
    }
}

fn default_leeway() -> u64 { 60 }

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self { Self { max_file_bytes: default_max_file_bytes() } }
}

fn default_max_file_bytes() -> usize { 10 * 1024 * 1024 }

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_true")]
    pub seed_on_start: bool,
    #[serde(default)]
    pub fallback_on_error: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self { Self { seed_on_start: true, fallback_on_error: false } }
}

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// 优先读取配置文件；文件不存在时使用默认值，再由环境变量补全
    pub fn load_or_default() -> Result<Self> {
        let path = config_path();
        let mut cfg = if std::path::Path::new(&path).exists() { load_from_file(&path)? } else { AppConfig::default() };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok());
        self.validate()
    }

    /// 用环境变量填充未在 TOML 中提供的字段；`lookup` 便于测试注入
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.database.normalize_from_env(&lookup);
        self.media.cloudinary.normalize_from_env(&lookup);
        self.auth.normalize_from_env(&lookup);
    }

    pub fn validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.validate()?;
        if self.media.backend == MediaBackend::Cloudinary {
            self.media.cloudinary.validate()?;
        }
        self.auth.validate()?;
        if self.upload.max_file_bytes == 0 {
            return Err(anyhow!("upload.max_file_bytes 必须 > 0"));
        }
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port 必须在 1..=65535 范围内"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        Ok(())
    }
}

impl DatabaseConfig {
    fn normalize_from_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: &F) {
        // 若 TOML 中未提供 URL，则尝试从环境变量填充
        if self.url.trim().is_empty() {
            if let Some(url) = lookup("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url 为空；请在 config.toml 或环境变量 DATABASE_URL 中提供"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url 必须以 postgresql:// 或 postgres:// 开头"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections 必须 >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections 必须 >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database 超时配置必须为正整数秒"));
        }
        Ok(())
    }
}

impl CloudinaryConfig {
    fn normalize_from_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: &F) {
        let fill = |field: &mut String, key: &str| {
            if field.trim().is_empty() {
                if let Some(v) = lookup(key) { *field = v; }
            }
        };
        fill(&mut self.cloud_name, "CLOUDINARY_CLOUD_NAME");
        fill(&mut self.api_key, "CLOUDINARY_API_KEY");
        fill(&mut self.api_secret, "CLOUDINARY_API_SECRET");
    }

    pub fn validate(&self) -> Result<()> {
        if self.cloud_name.trim().is_empty() || self.api_key.trim().is_empty() || self.api_secret.trim().is_empty() {
            return Err(anyhow!("media.cloudinary 需要 cloud_name/api_key/api_secret（或 CLOUDINARY_* 环境变量）"));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("media.cloudinary.timeout_secs 必须 > 0"));
        }
        Ok(())
    }
}

impl AuthConfig {
    fn normalize_from_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: &F) {
        if self.jwt_secret.as_deref().map_or(true, |s| s.trim().is_empty()) {
            self.jwt_secret = lookup("JWT_SECRET").filter(|s| !s.trim().is_empty());
        }
        if self.jwt_public_key_pem.as_deref().map_or(true, |s| s.trim().is_empty()) {
            self.jwt_public_key_pem = lookup("CLERK_JWT_KEY").filter(|s| !s.trim().is_empty());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.is_none() && self.jwt_public_key_pem.is_none() {
            return Err(anyhow!("auth 需要 jwt_secret 或 jwt_public_key_pem（或 JWT_SECRET / CLERK_JWT_KEY）"));
        }
        Ok(())
    }
}
