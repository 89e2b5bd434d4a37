mod app;
mod args;
mod canvas;
mod headless;
mod projection;

use app::{DashboardApp, Panel};
use args::Args;
use canvas::{CanvasRenderer, SharedScene};
use clap::Parser;
use headless::TracingRenderer;
use mmwave_awr::{RadarSystem, SimulatedDevice};
use mmwave_core::{config::Configuration, logging::enable_tracing};
use mmwave_presenter::{LiveView, PointSource, Renderer, View, ViewHandle};
use std::{
    error::Error,
    sync::{Arc, OnceLock},
};
use tracing::{error, info};

type Radar = RadarSystem<SimulatedDevice>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    if args.wants_tracing() {
        enable_tracing(args.debug);
    }

    let configuration = match &args.config {
        Some(path) => Configuration::from_file(path)?,
        None => Configuration::default(),
    };
    info!(configuration=?configuration, "loaded configuration");

    let radar = Arc::new(Radar::connect(&configuration.radar)?);
    radar.start()?;

    let views = args.view.views();
    let result = if args.headless {
        run_headless(&radar, &configuration, views).await
    } else {
        run_window(&radar, &configuration, views).await
    };

    let stopped = radar.stop();
    match Arc::try_unwrap(radar) {
        Ok(radar) => radar.teardown(),
        Err(_) => error!("radar still shared at shutdown, releasing with last reference"),
    }

    result?;
    stopped?;
    Ok(())
}

fn spawn_views<R: Renderer>(
    radar: &Arc<Radar>,
    configuration: &Configuration,
    views: Vec<View>,
    mut renderer: impl FnMut(&View) -> R,
) -> Vec<ViewHandle<Radar, R>> {
    views
        .into_iter()
        .map(|view| {
            let renderer = renderer(&view);
            LiveView::new(radar.clone(), view, configuration.detection_limit, renderer).spawn()
        })
        .collect()
}

async fn stop_views<S: PointSource, R: Renderer>(handles: Vec<ViewHandle<S, R>>) {
    for handle in &handles {
        handle.stop();
    }
    for handle in handles {
        let name = handle.name().to_owned();
        match handle.join().await {
            Ok(view) => info!(view = %name, report = ?view.report(), "view finished"),
            Err(e) => error!(view = %name, error = %e, "view task failed"),
        }
    }
}

async fn run_headless(
    radar: &Arc<Radar>,
    configuration: &Configuration,
    views: Vec<View>,
) -> Result<(), Box<dyn Error>> {
    info!(interval=?radar.redraw_interval(), "running headless, ctrl-c to stop");
    let handles = spawn_views(radar, configuration, views, |_| TracingRenderer);
    let result = match async_ctrlc::CtrlC::new() {
        Ok(ctrlc) => {
            ctrlc.await;
            Ok(())
        }
        Err(e) => Err(e.into()),
    };
    stop_views(handles).await;
    result
}

async fn run_window(
    radar: &Arc<Radar>,
    configuration: &Configuration,
    views: Vec<View>,
) -> Result<(), Box<dyn Error>> {
    let repaint = Arc::new(OnceLock::new());
    let mut panels = Vec::new();
    let handles = spawn_views(radar, configuration, views, |view| {
        let scene = SharedScene::default();
        panels.push(Panel {
            view: view.clone(),
            scene: scene.clone(),
        });
        CanvasRenderer::new(scene, repaint.clone())
    });

    let result = eframe::run_native(
        "Millimeter Wave Radar",
        eframe::NativeOptions::default(),
        Box::new(move |cc| {
            let _ = repaint.set(cc.egui_ctx.clone());
            Box::new(DashboardApp::new(panels))
        }),
    );

    stop_views(handles).await;
    result.map_err(|e| e.to_string().into())
}
