use secrecy::SecretString;

pub mod server;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        redis_url: String,
        secret: SecretString,
        admin_secret: SecretString,
        allowed_origins: Vec<String>,
        production: bool,
    },
}
