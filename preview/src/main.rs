//! Desktop preview app for myrtio-stage-lights
//!
//! Runs the hydrogen demo chain in a window with synthetic time. All
//! engine changes go through the intent channel, like on the device.

use std::time::Instant as StdInstant;

use eframe::egui::{self};
use myrtio_stage_lights::{
    Engine, EngineConfig, EngineIntent, Flag, Instant, IntentChannel, IntentSender, PixelRange,
};

/// Pixel capacity of the engine
const MAX_LEDS: usize = 180;

/// Size of each LED rectangle in pixels
const LED_SIZE: f32 = 12.0;

/// Gap between LEDs
const LED_GAP: f32 = 2.0;

/// Intent channel size
const INTENT_CHANNEL_SIZE: usize = 16;

/// Static intent channel for communication between UI and engine
static INTENTS_CHANNEL: IntentChannel<INTENT_CHANNEL_SIZE> =
    IntentChannel::<INTENT_CHANNEL_SIZE>::new();

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 600.0])
            .with_title("Stage Lights Preview"),
        ..Default::default()
    };

    eframe::run_native(
        "myrtio-stage-preview",
        options,
        Box::new(|_cc| {
            let app = PreviewApp::new().map_err(|error| error.to_string())?;
            Ok(Box::new(app))
        }),
    )
}

struct PreviewApp {
    engine: Engine<'static, MAX_LEDS, INTENT_CHANNEL_SIZE>,
    intent_sender: IntentSender<'static, INTENT_CHANNEL_SIZE>,

    /// Synthetic time in milliseconds
    t_ms: u64,
    /// Wall-clock reference for delta time
    last_frame: StdInstant,
    playing: bool,
    /// Time scale multiplier (1.0 = realtime)
    time_scale: f32,
    led_size: f32,
    /// Range swept by the LED check
    test_start: u16,
    test_end: u16,
}

impl PreviewApp {
    fn new() -> Result<Self, myrtio_stage_lights::ConfigError> {
        let config = EngineConfig::hydrogen_demo();
        let test_end = config.led_count.saturating_sub(1);
        let engine = Engine::<MAX_LEDS, INTENT_CHANNEL_SIZE>::new(INTENTS_CHANNEL.receiver(), &config)?;

        Ok(Self {
            engine,
            intent_sender: INTENTS_CHANNEL.sender(),
            t_ms: 0,
            last_frame: StdInstant::now(),
            playing: true,
            time_scale: 1.0,
            led_size: LED_SIZE,
            test_start: 0,
            test_end,
        })
    }

    fn send(&self, intent: EngineIntent) {
        let _ = self.intent_sender.post(intent);
    }

    /// Update synthetic time based on wall clock and time scale
    fn update_time(&mut self) {
        let now = StdInstant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;

        if self.playing {
            let delta_ms_f64 = delta.as_secs_f64() * 1000.0 * f64::from(self.time_scale);
            let delta_ms_f64 = if delta_ms_f64.is_finite() {
                #[allow(clippy::cast_precision_loss)]
                delta_ms_f64.clamp(0.0, u64::MAX as f64)
            } else {
                0.0
            };
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let delta_ms = delta_ms_f64 as u64;
            self.t_ms = self.t_ms.wrapping_add(delta_ms);
        }
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_time();

        let now = Instant::from_millis(self.t_ms);
        let frame = self.engine.render(now).to_vec();
        let flags = self.engine.flags();

        ctx.request_repaint();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                // <PlaybackControls>
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        if ui
                            .button(if self.playing { "⏸ Pause" } else { "▶ Play" })
                            .clicked()
                        {
                            self.playing = !self.playing;
                        }
                        let secs = self.t_ms / 1000;
                        let ms = self.t_ms % 1000;
                        ui.label(format!("Time: {secs}.{ms:03}s"));
                    });

                    ui.add_space(4.0);

                    ui.horizontal(|ui| {
                        ui.label("Speed:");
                        ui.add(egui::Slider::new(&mut self.time_scale, 0.1..=10.0).logarithmic(true));
                    });

                    ui.add_space(4.0);

                    ui.horizontal(|ui| {
                        ui.label("Size: ");
                        ui.add(egui::Slider::new(&mut self.led_size, 4.0..=32.0));
                    });
                });
                // </PlaybackControls>
                ui.add_space(16.0);
                // <ChainControls>
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        let ready = self.engine.is_ready();
                        if ui.add_enabled(ready, egui::Button::new("▶ Start cycle")).clicked() {
                            self.send(EngineIntent::StartCycle);
                        }
                        if ui.button("⏮ Reset").clicked() {
                            self.send(EngineIntent::Reset);
                        }
                    });

                    ui.add_space(4.0);

                    ui.horizontal(|ui| {
                        ui.label("LED check:");
                        ui.add(egui::DragValue::new(&mut self.test_start).range(0u16..=self.test_end));
                        ui.add(egui::DragValue::new(&mut self.test_end).range(self.test_start..=u16::MAX));
                        if self.engine.is_testing() {
                            if ui.button("Stop").clicked() {
                                self.send(EngineIntent::StopTest);
                            }
                        } else if ui.button("Start").clicked() {
                            let range = PixelRange::new(self.test_start, self.test_end);
                            self.send(EngineIntent::StartTest(range));
                        }
                    });
                });
                // </ChainControls>
            });

            ui.add_space(8.0);

            // === Process flags ===
            ui.horizontal_wrapped(|ui| {
                for flag in Flag::ALL {
                    let color = if flags.get(flag) {
                        egui::Color32::from_rgb(255, 64, 64)
                    } else {
                        egui::Color32::DARK_GRAY
                    };
                    ui.colored_label(color, flag.as_str());
                }
            });

            if let Some(storage) = self.engine.controller().storage() {
                ui.label(format!("Storage: {}", storage.phase().as_str()));
            }

            ui.add_space(16.0);

            // === LED Display ===
            let available_width = ui.available_width();
            let led_pitch = self.led_size + LED_GAP;

            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let leds_per_row = (available_width / led_pitch).floor().max(1.0) as usize;
            let rows = frame.len().div_ceil(leds_per_row);
            #[allow(clippy::cast_precision_loss)]
            let height = rows as f32 * led_pitch;

            let (response, painter) =
                ui.allocate_painter(egui::vec2(available_width, height), egui::Sense::hover());
            let origin = response.rect.min;

            #[allow(clippy::cast_precision_loss)]
            for (i, pixel) in frame.iter().enumerate() {
                let row = i / leds_per_row;
                let col = i % leds_per_row;
                let x = origin.x + col as f32 * led_pitch;
                let y = origin.y + row as f32 * led_pitch;

                let rect = egui::Rect::from_min_size(
                    egui::pos2(x, y),
                    egui::vec2(self.led_size, self.led_size),
                );
                painter.rect_filled(rect, 3.0, egui::Color32::from_rgb(pixel.r, pixel.g, pixel.b));
            }
        });
    }
}
