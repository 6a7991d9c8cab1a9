use log::LevelFilter;
use env_logger::{Builder, Env};
use std::io::Write;
use chrono::Local;

/// Timestamped operator log on stderr.
pub fn init() {
    builder(Env::default()).init();
}

/// Info by default; `RUST_LOG` is parsed last so it can raise verbosity to
/// the per-request `debug!` lines.
fn builder(env: Env) -> Builder {
    let mut builder = Builder::new();
    builder
        .format(|buf, record| {
            writeln!(buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .parse_env(env);
    builder
}
