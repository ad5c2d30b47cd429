// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: quantity takeoff from a scanned floor plan image
//!
//! Runs the full legend-driven pipeline and writes a JSON report plus
//! an annotated overlay PNG. Without an OCR backend the scale falls
//! back to 1:100 (pass --scale to pin it); without a VLM backend the
//! bundled fill-density labeler classifies swatches heuristically
//! (pass --labels to replay canned responses instead).
//!
//! Usage:
//!   plan-takeoff <image_path> [options]

use image::{ImageReader, RgbaImage};
use std::env;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use takeoff_core::AnalysisConfig;
use takeoff_vision::ocr::{NullOcr, OcrEngine, OcrOutput};
use takeoff_vision::{analyze_plan, render_overlay, PatternLabeler};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let image_path = &args[1];

    // Parse options
    let mut output_path = String::from("takeoff.json");
    let mut overlay_path: Option<String> = None;
    let mut scale_ratio: Option<u32> = None;
    let mut labels_path: Option<String> = None;
    let mut config_path: Option<String> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--output" => {
                i += 1;
                output_path = args[i].clone();
            }
            "--overlay" => {
                i += 1;
                overlay_path = Some(args[i].clone());
            }
            "--scale" => {
                i += 1;
                scale_ratio = Some(args[i].parse().expect("Invalid scale value"));
            }
            "--labels" => {
                i += 1;
                labels_path = Some(args[i].clone());
            }
            "--config" => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            other => {
                eprintln!("Unknown option: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    println!("=== Plan Takeoff ===");
    println!();

    // Step 1: Load image
    println!("[1/5] Loading image: {}", image_path);
    let plan: RgbaImage = ImageReader::open(image_path)
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot open image '{}': {}", image_path, e);
            std::process::exit(1);
        })
        .decode()
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot decode image '{}': {}", image_path, e);
            std::process::exit(1);
        })
        .to_rgba8();
    println!("  Image size: {}x{} pixels", plan.width(), plan.height());

    // Step 2: Configuration
    println!("[2/5] Configuring analysis...");
    let config: AnalysisConfig = match &config_path {
        Some(path) => {
            let text = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error: Cannot read config '{}': {}", path, e);
                std::process::exit(1);
            });
            serde_json::from_str(&text).unwrap_or_else(|e| {
                eprintln!("Error: Cannot parse config '{}': {}", path, e);
                std::process::exit(1);
            })
        }
        None => AnalysisConfig::default(),
    };
    println!(
        "  Legend corner: {:?}, tile size: {}px, scan: {} dpi",
        config.legend.corner, config.matcher.tile_size, config.scan_dpi
    );

    let ocr: Box<dyn OcrEngine> = match scale_ratio {
        Some(ratio) => {
            println!("  Pinned scale: 1:{}", ratio);
            Box::new(FixedScaleOcr { ratio })
        }
        None => Box::new(NullOcr),
    };

    let labeler: Box<dyn PatternLabeler> = match &labels_path {
        Some(path) => {
            let text = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error: Cannot read labels '{}': {}", path, e);
                std::process::exit(1);
            });
            let responses: Vec<String> = serde_json::from_str(&text).unwrap_or_else(|e| {
                eprintln!("Error: Cannot parse labels '{}': {}", path, e);
                std::process::exit(1);
            });
            println!("  Labeler: {} canned responses from {}", responses.len(), path);
            Box::new(ReplayLabeler {
                responses,
                next: AtomicUsize::new(0),
            })
        }
        None => {
            println!("  Labeler: fill-density heuristic");
            Box::new(DensityLabeler)
        }
    };

    // Step 3: Run the pipeline
    println!("[3/5] Analyzing plan...");
    let report = match analyze_plan(&plan, &config, ocr.as_ref(), labeler.as_ref()) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    println!(
        "  Scale: {} ({}){}",
        report.scale.notation,
        format_args!("{:.2} px/m", report.scale.pixels_per_meter),
        if report.scale.fallback { " [fallback]" } else { "" }
    );
    println!("  Elements: {}", report.results.len());
    for diagnostic in &report.diagnostics {
        println!("  warning [{:?}]: {}", diagnostic.stage, diagnostic.message);
    }

    // Step 4: Write the JSON report
    println!("[4/5] Writing report: {}", output_path);
    let json = serde_json::to_string_pretty(&report).unwrap_or_else(|e| {
        eprintln!("Error: Cannot serialize report: {}", e);
        std::process::exit(1);
    });
    fs::write(&output_path, json).unwrap_or_else(|e| {
        eprintln!("Error: Cannot write report '{}': {}", output_path, e);
        std::process::exit(1);
    });

    // Step 5: Render the overlay
    let overlay_path = overlay_path.unwrap_or_else(|| {
        Path::new(image_path)
            .with_extension("overlay.png")
            .to_string_lossy()
            .to_string()
    });
    println!("[5/5] Rendering overlay: {}", overlay_path);
    let overlay = render_overlay(&plan, &report.results);
    overlay.save(&overlay_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not save overlay: {}", e);
    });

    // Print summary
    println!();
    println!("=== Takeoff Summary ===");
    for result in &report.results {
        println!(
            "  {:<20} {:>8.2} {:<4} ({} matches, confidence {:.2})",
            result.element,
            result.measurement,
            result.unit,
            result.match_count,
            result.average_confidence
        );
    }
    println!(
        "  Totals: {:.2} m² wall area, {:.0} openings, {} matches",
        report.summary.total_wall_area,
        report.summary.total_openings,
        report.summary.total_matches
    );
    println!();
    println!("Done! Report written to {}.", output_path);
}

/// OCR stand-in that reports a pinned scale notation for every region.
struct FixedScaleOcr {
    ratio: u32,
}

impl OcrEngine for FixedScaleOcr {
    fn recognize(
        &self,
        _region: &RgbaImage,
        _language: &str,
    ) -> takeoff_vision::Result<OcrOutput> {
        Ok(OcrOutput {
            text: format!("1:{}", self.ratio),
            words: Vec::new(),
        })
    }
}

/// Replays canned classifier responses in swatch order. Runs past the
/// end return an empty response and fall through to the keyword
/// fallback.
struct ReplayLabeler {
    responses: Vec<String>,
    next: AtomicUsize,
}

impl PatternLabeler for ReplayLabeler {
    fn label(&self, _swatch: &RgbaImage, _prompt: &str) -> takeoff_vision::Result<String> {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(self.responses.get(index).cloned().unwrap_or_default())
    }
}

/// Offline classifier: maps swatch fill density to an element type.
/// Dense hatching reads as wall, sparse marks as opening, near-empty
/// swatches as reference symbols.
struct DensityLabeler;

impl PatternLabeler for DensityLabeler {
    fn label(&self, swatch: &RgbaImage, _prompt: &str) -> takeoff_vision::Result<String> {
        let density = takeoff_vision::image_ops::ink_ratio(
            swatch,
            0,
            0,
            swatch.width().max(swatch.height()),
            240.0,
        );
        let response = if density > 0.35 {
            r#"{"elementType":"Wall","category":"wall","measurementType":"area","confidence":0.6}"#
        } else if density > 0.1 {
            r#"{"elementType":"Opening","category":"opening","measurementType":"count","confidence":0.55}"#
        } else {
            r#"{"elementType":"Reference","category":"reference","measurementType":"none","confidence":0.5}"#
        };
        Ok(response.to_string())
    }
}

fn print_usage() {
    println!(
        r#"Plan Takeoff
============

Measures building elements on a scanned floor plan: segments the
legend into pattern swatches, classifies them, searches the whole
plan for each pattern and reports areas and counts at the drawing
scale.

USAGE:
  plan-takeoff <image_path> [OPTIONS]

ARGUMENTS:
  <image_path>         Path to the plan image (PNG, JPEG)

OPTIONS:
  --output <path>      Output JSON report path (default: takeoff.json)
  --overlay <path>     Annotated PNG path (default: <image>.overlay.png)
  --scale <n>          Pin the drawing scale to 1:n (skips OCR)
  --labels <path>      JSON array of canned classifier responses
  --config <path>      JSON analysis configuration
  -h, --help           Show this help message

EXAMPLES:
  # Heuristic run at the fallback scale
  plan-takeoff grundriss.png

  # Pinned scale with replayed classifier responses
  plan-takeoff grundriss.png --scale 50 --labels labels.json --output eg.json
"#
    );
}
