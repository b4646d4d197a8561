/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Entry point (§6): parses the command line, loads the asset pack,
//! opens the startup URL (if any), and drives the engine's cooperative
//! tick loop until the page finishes loading, then paints one final
//! frame. Exit code 0 on clean shutdown, 1 on fatal initialization
//! failure.

use std::process::ExitCode;

use microweb_assets::AssetPack;
use microweb_draw::DrawContext;
use microweb_net::TcpNetworkDriver;

use microweb::engine::Engine;
use microweb::input::NullInputDriver;
use microweb::opts;
use microweb::video::{self, SoftwareVideoDriver, VideoDriver};

/// A run gives up waiting on the page task after this many ticks rather
/// than spinning forever against a driver that never reports an error.
const MAX_TICKS: usize = 100_000;

/// Default asset pack path a real install would ship; falls back to the
/// bundled fixture pack (grounded on `servoshell`'s `baked-in-resources`
/// default) when no file is present, so the binary is runnable with
/// nothing but this repository.
const ASSET_PACK_PATH: &str = "microweb.dat";

fn load_assets() -> Result<AssetPack, String> {
    let bytes = match std::fs::read(ASSET_PACK_PATH) {
        Ok(bytes) => bytes,
        Err(_) => microweb_assets::test_fixture_pack(),
    };
    AssetPack::load(&bytes).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    let opts = opts::from_args(&args);

    let mode = match opts.video_mode {
        Some(letter) => match video::mode_by_letter(letter) {
            Some(mode) => mode,
            None => {
                eprintln!("error: unknown video mode '{letter}'");
                return ExitCode::FAILURE;
            }
        },
        None => video::default_mode(),
    };

    let assets = match load_assets() {
        Ok(assets) => assets,
        Err(e) => {
            eprintln!("error: failed to load asset pack: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut video_driver = SoftwareVideoDriver::new(mode, opts.invert);
    let colors = video_driver.colors();
    let mut input_driver = NullInputDriver::default();

    let mut engine = Engine::new(
        opts.clone(),
        assets,
        colors,
        mode.width,
        mode.height,
        TcpNetworkDriver::new(),
        TcpNetworkDriver::new(),
    );

    if let Some(url) = &opts.url {
        engine.open_url(url);
    }

    let mut ticks = 0;
    loop {
        let report = engine.tick(&mut input_driver);
        if let Some(status) = &report.status {
            log::info!("{status}");
        }
        ticks += 1;
        if !report.loading || ticks >= MAX_TICKS {
            break;
        }
    }

    {
        let mut ctx = DrawContext::new(video_driver.surface());
        engine.paint(&mut ctx);
    }
    video_driver.shutdown();

    ExitCode::SUCCESS
}
