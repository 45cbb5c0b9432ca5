//! Shared test doubles: a scripted scene engine, connectors, and image files

#![allow(dead_code)]

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use sculpt::prelude::*;
use sculpt::{CommandKind, ContourClassifier, Response};
use serde_json::{Map, Value};
use silhouette::ShapeError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// How the scripted engine answers a command
pub enum Reply {
    Success,
    Failure(String),
    /// The connection breaks while the command is in flight
    Hangup,
}

pub type Rule = Arc<dyn Fn(&Command) -> Reply + Send + Sync>;

pub fn always_succeed() -> Rule {
    Arc::new(|_: &Command| Reply::Success)
}

/// Fail the first `times` commands of `kind`, succeed otherwise
pub fn fail_kind(kind: CommandKind, times: usize, detail: &str) -> Rule {
    let seen = AtomicUsize::new(0);
    let detail = detail.to_string();
    Arc::new(move |command: &Command| {
        if command.kind() == kind && seen.fetch_add(1, Ordering::SeqCst) < times {
            Reply::Failure(detail.clone())
        } else {
            Reply::Success
        }
    })
}

/// Break the connection on the `nth` (1-based) command of `kind`
pub fn hangup_on(kind: CommandKind, nth: usize) -> Rule {
    let seen = AtomicUsize::new(0);
    Arc::new(move |command: &Command| {
        if command.kind() == kind && seen.fetch_add(1, Ordering::SeqCst) + 1 == nth {
            Reply::Hangup
        } else {
            Reply::Success
        }
    })
}

#[derive(Debug, Clone)]
pub struct Sent {
    pub kind: CommandKind,
    pub params: Map<String, Value>,
}

#[derive(Debug, Default)]
pub struct Journal {
    pub sent: Vec<Sent>,
    pub connects: usize,
    pub closes: usize,
}

pub type SharedJournal = Arc<Mutex<Journal>>;

pub fn kinds(journal: &SharedJournal) -> Vec<CommandKind> {
    journal.lock().unwrap().sent.iter().map(|s| s.kind).collect()
}

/// In-memory engine that records every command it receives
pub struct RecordingEngine {
    journal: SharedJournal,
    rule: Rule,
    connected: bool,
}

impl RecordingEngine {
    pub fn new(rule: Rule) -> (Self, SharedJournal) {
        let journal = SharedJournal::default();
        let engine = Self {
            journal: journal.clone(),
            rule,
            connected: true,
        };
        (engine, journal)
    }
}

#[async_trait]
impl SceneEngine for RecordingEngine {
    async fn send(&mut self, command: Command) -> Result<Response, ProtocolError> {
        if !self.connected {
            return Err(ProtocolError::Connection("engine connection closed".into()));
        }

        self.journal.lock().unwrap().sent.push(Sent {
            kind: command.kind(),
            params: command.params().clone(),
        });

        match (self.rule)(&command) {
            Reply::Success => Ok(Response::success(None)),
            Reply::Failure(detail) => Ok(Response::failure(detail)),
            Reply::Hangup => {
                self.connected = false;
                Err(ProtocolError::Connection("connection reset by peer".into()))
            }
        }
    }

    async fn close(&mut self) {
        if self.connected {
            self.connected = false;
            self.journal.lock().unwrap().closes += 1;
        }
    }
}

/// Connector handing out recording engines that share one journal
pub struct MockConnector {
    pub journal: SharedJournal,
    rule: Rule,
}

impl MockConnector {
    pub fn new(rule: Rule) -> Self {
        Self {
            journal: SharedJournal::default(),
            rule,
        }
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Engine = RecordingEngine;

    async fn connect(&self) -> Result<Self::Engine, ProtocolError> {
        self.journal.lock().unwrap().connects += 1;
        Ok(RecordingEngine {
            journal: self.journal.clone(),
            rule: self.rule.clone(),
            connected: true,
        })
    }
}

/// Connector whose engine is never reachable
pub struct RefusingConnector;

#[async_trait]
impl Connector for RefusingConnector {
    type Engine = RecordingEngine;

    async fn connect(&self) -> Result<Self::Engine, ProtocolError> {
        Err(ProtocolError::Connection(
            "failed to connect to localhost:5000: connection refused".into(),
        ))
    }
}

/// Contour classifier that counts its invocations
#[derive(Clone, Default)]
pub struct CountingClassifier {
    pub calls: Arc<AtomicUsize>,
}

impl CountingClassifier {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageClassifier for CountingClassifier {
    fn classify(&self, path: &Path) -> Result<ImageDescriptor, ShapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ContourClassifier.classify(path)
    }
}

/// Settings writing into `root`, with no delay between assets
pub fn test_settings(root: &Path) -> Settings {
    Settings::new(root)
        .with_output_dir(root.join("assets"))
        .with_texture_dir(root.join("textures"))
        .with_asset_delay(std::time::Duration::ZERO)
}

#[derive(Debug, Clone, Copy)]
pub enum Shape {
    Triangle,
    Circle,
    Rectangle,
}

/// Write a solid shape on a white 200x200 canvas as a PNG
pub fn write_shape(dir: &Path, file_name: &str, shape: Shape) -> PathBuf {
    let mut image = RgbImage::from_pixel(200, 200, Rgb([255, 255, 255]));
    match shape {
        Shape::Triangle => {
            let points = [
                Point::new(100, 20),
                Point::new(180, 180),
                Point::new(20, 180),
            ];
            draw_polygon_mut(&mut image, &points, Rgb([20, 140, 40]));
        }
        Shape::Circle => draw_filled_circle_mut(&mut image, (100, 100), 80, Rgb([220, 30, 30])),
        Shape::Rectangle => draw_filled_rect_mut(
            &mut image,
            Rect::at(20, 30).of_size(160, 140),
            Rgb([0, 0, 255]),
        ),
    }

    let path = dir.join(file_name);
    image
        .save_with_format(&path, image::ImageFormat::Png)
        .unwrap();
    path
}

/// Write a file with an image extension that is not an image
pub fn write_garbage(dir: &Path, file_name: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, b"definitely not a png").unwrap();
    path
}

/// Descriptor for builder tests that skip classification
pub fn descriptor(silhouette: SilhouetteClass) -> ImageDescriptor {
    ImageDescriptor {
        width: 200,
        height: 200,
        dominant_color: [255, 255, 255],
        silhouette,
        contour_area: 12_000.0,
        contour_count: 1,
    }
}
