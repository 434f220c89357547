//! tine - terminal electric piano
//!
//! Run with: cargo run --bin tine

mod app;
mod ui;

use app::TineApp;
use tine_dsp::{sequencing, EngineConfig};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    TineApp::new()
        .bpm(92.0)
        .config(EngineConfig::default().with_voices(16))
        .phrase(sequencing::demo())
        .run()
}
