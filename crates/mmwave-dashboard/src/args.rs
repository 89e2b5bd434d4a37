use clap::{Parser, ValueEnum};
use mmwave_presenter::View;
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ViewChoice {
    #[value(name = "3d")]
    ThreeD,
    #[value(name = "2d")]
    TwoD,
    Both,
}

impl ViewChoice {
    pub fn views(self) -> Vec<View> {
        match self {
            ViewChoice::ThreeD => vec![View::scatter_3d()],
            ViewChoice::TwoD => vec![View::scatter_2d()],
            ViewChoice::Both => vec![View::scatter_3d(), View::scatter_2d()],
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Live point cloud from a millimeter wave radar", long_about = None)]
pub struct Args {
    /// JSON configuration file, defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Which projections to show
    #[arg(short, long, value_enum, default_value_t = ViewChoice::Both)]
    pub view: ViewChoice,

    /// Log frames instead of opening a window
    #[arg(long, default_value_t = false)]
    pub headless: bool,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    pub debug: bool,

    /// Whether to use tracing, always on when headless
    #[arg(short, long, default_value_t = false)]
    pub tracing: bool,
}

impl Args {
    /// Headless frames are only reported through tracing.
    pub fn wants_tracing(&self) -> bool {
        self.tracing || self.headless
    }
}
