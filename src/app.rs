use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use egui::Context;
use log::{debug, error, info};

use crate::config::AppConfig;
use crate::constants::UI_STATUS_MESSAGE_DURATION;
use crate::engine::{DirectoryContents, ProgressEngine};
use crate::error::Result;
use crate::events::AppEvent;
use crate::registry::DirectoryRegistry;

/// Thin shell over the registry and engine: a root list with progress bars
/// and a per-directory view with watched checkboxes. All walks run on
/// background threads; results come back over the event channel tagged
/// with the generation they were requested under.
pub struct CourseTrackerApp {
    registry: DirectoryRegistry,
    engine: ProgressEngine,

    // Navigation state
    current_directory: Option<PathBuf>,
    current_progress: Option<f64>,
    contents: Option<DirectoryContents>,
    roots: Vec<(PathBuf, f64)>,

    // Communication
    event_sender: mpsc::Sender<AppEvent>,
    event_receiver: mpsc::Receiver<AppEvent>,
    scan_generation: u64,
    is_loading: bool,

    // UI feedback
    status_message: Option<(String, Instant)>,
    error_message: Option<String>,
}

enum RowAction {
    Open(PathBuf),
    Toggle(PathBuf, bool),
}

impl CourseTrackerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let (event_sender, event_receiver) = mpsc::channel();

        let registry = DirectoryRegistry::load(&config);
        let mut engine = ProgressEngine::load(&config);
        engine.subscribe(event_sender.clone());

        let mut app = Self {
            registry,
            engine,
            current_directory: None,
            current_progress: None,
            contents: None,
            roots: Vec::new(),
            event_sender,
            event_receiver,
            scan_generation: 0,
            is_loading: false,
            status_message: None,
            error_message: None,
        };
        app.refresh_roots();
        app
    }

    fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
        self.error_message = None;
    }

    fn set_error_message(&mut self, message: String) {
        self.error_message = Some(message);
        self.status_message = None;
    }

    /// Recomputes every tracked root's rollup on a background thread.
    fn refresh_roots(&mut self) {
        self.scan_generation += 1;
        let generation = self.scan_generation;
        self.is_loading = true;

        let view = self.engine.snapshot();
        let roots: Vec<PathBuf> = self.registry.list().to_vec();
        let sender = self.event_sender.clone();

        thread::spawn(move || {
            let roots = roots
                .into_iter()
                .map(|path| {
                    let progress = view.directory_progress(&path);
                    (path, progress)
                })
                .collect();

            if let Err(e) = sender.send(AppEvent::RootsLoaded { generation, roots }) {
                error!("Failed to send root progress results: {}", e);
            }
        });
    }

    fn open_directory(&mut self, directory: PathBuf) {
        info!("Opening directory: {:?}", directory);
        self.scan_generation += 1;
        let generation = self.scan_generation;
        self.is_loading = true;
        self.current_directory = Some(directory.clone());
        self.current_progress = None;
        self.contents = None;

        let view = self.engine.snapshot();
        let sender = self.event_sender.clone();

        thread::spawn(move || {
            let result = view.directory_contents(&directory);
            let percent = view.directory_progress(&directory);

            if let Err(e) = sender.send(AppEvent::ContentsLoaded {
                generation,
                directory: directory.clone(),
                result,
            }) {
                error!("Failed to send directory contents: {}", e);
                return;
            }
            let _ = sender.send(AppEvent::ProgressChanged { directory, percent });
        });
    }

    fn go_back(&mut self) {
        self.current_directory = None;
        self.current_progress = None;
        self.contents = None;
        self.refresh_roots();
    }

    fn add_directory_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new().pick_folder() {
            match self.registry.add(&path) {
                Ok(true) => {
                    self.set_status_message(format!("Now tracking {}", path.display()));
                    self.refresh_roots();
                }
                Ok(false) => {
                    self.set_status_message(format!("{} is already tracked", path.display()));
                }
                Err(e) => {
                    error!("Failed to save tracked directories: {}", e);
                    self.set_error_message(format!("Could not save directory list: {}", e));
                }
            }
        }
    }

    fn remove_current_directory(&mut self) {
        let Some(directory) = self.current_directory.clone() else {
            return;
        };
        match self.registry.remove(&directory) {
            Ok(true) => {
                self.set_status_message(format!("Stopped tracking {}", directory.display()));
                self.go_back();
            }
            Ok(false) => {
                self.set_status_message("Directory was not tracked".to_string());
            }
            Err(e) => {
                error!("Failed to save tracked directories: {}", e);
                self.set_error_message(format!("Could not save directory list: {}", e));
            }
        }
    }

    fn toggle_watched(&mut self, file_path: &Path, watched: bool) {
        match self.engine.set_watched(file_path, watched) {
            Ok(_percent) => {
                // Row state; the rollup update arrives as ProgressChanged.
                if let Some(contents) = &mut self.contents {
                    if let Some(entry) = contents.files.iter_mut().find(|f| f.path == file_path) {
                        entry.watched = watched;
                    }
                }
            }
            Err(e) => {
                error!("Failed to save watched state: {}", e);
                self.set_error_message(format!("Could not save watched state: {}", e));
            }
        }
    }

    fn handle_contents_loaded(
        &mut self,
        generation: u64,
        directory: PathBuf,
        result: Result<DirectoryContents>,
    ) {
        if generation != self.scan_generation {
            debug!("Dropping stale contents for {:?}", directory);
            return;
        }
        self.is_loading = false;

        match result {
            Ok(contents) => {
                self.contents = Some(contents);
            }
            Err(e) => {
                error!("Failed to read directory {:?}: {}", directory, e);
                self.set_error_message(format!("Failed to read directory: {}", e));
                self.current_directory = None;
                self.refresh_roots();
            }
        }
    }

    fn handle_progress_changed(&mut self, directory: &Path, percent: f64) {
        if self.current_directory.as_deref() == Some(directory) {
            self.current_progress = Some(percent);
        }
        if let Some(contents) = &mut self.contents {
            if let Some(entry) = contents.subdirs.iter_mut().find(|d| d.path == directory) {
                entry.progress = percent;
            }
        }
        if let Some(root) = self.roots.iter_mut().find(|(path, _)| path == directory) {
            root.1 = percent;
        }
    }

    fn process_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            match event {
                AppEvent::ContentsLoaded {
                    generation,
                    directory,
                    result,
                } => {
                    self.handle_contents_loaded(generation, directory, result);
                }
                AppEvent::RootsLoaded { generation, roots } => {
                    if generation == self.scan_generation {
                        self.roots = roots;
                        self.is_loading = false;
                    } else {
                        debug!("Dropping stale root progress results");
                    }
                }
                AppEvent::ProgressChanged { directory, percent } => {
                    self.handle_progress_changed(&directory, percent);
                }
            }
        }
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let can_go_back = self.current_directory.is_some();
            if ui.add_enabled(can_go_back, egui::Button::new("Back")).clicked() {
                self.go_back();
            }

            if ui.button("Add Directory").clicked() {
                self.add_directory_dialog();
            }

            let viewing_tracked = self
                .current_directory
                .as_deref()
                .map(|d| self.registry.contains(d))
                .unwrap_or(false);
            if ui
                .add_enabled(viewing_tracked, egui::Button::new("Remove Directory"))
                .clicked()
            {
                self.remove_current_directory();
            }

            if self.is_loading {
                ui.spinner();
            }
        });
    }

    fn render_messages(&mut self, ui: &mut egui::Ui) {
        if let Some((_, timestamp)) = &self.status_message {
            if timestamp.elapsed() > UI_STATUS_MESSAGE_DURATION {
                self.status_message = None;
            }
        }

        if let Some((message, _)) = &self.status_message {
            let message = message.clone();
            ui.colored_label(egui::Color32::from_rgb(0, 120, 0), message);
        } else if let Some(error_message) = &self.error_message {
            let error_message = error_message.clone();
            ui.horizontal(|ui| {
                ui.colored_label(egui::Color32::from_rgb(150, 0, 0), &error_message);
                if ui.small_button("Dismiss").clicked() {
                    self.error_message = None;
                }
            });
        }
    }

    fn render_root_list(&mut self, ui: &mut egui::Ui) {
        if self.roots.is_empty() && !self.is_loading {
            ui.weak("No tracked directories. Use \"Add Directory\" to start.");
            return;
        }

        let mut to_open = None;
        for (path, progress) in &self.roots {
            ui.horizontal(|ui| {
                let name = display_name(path);
                if ui.button(name).clicked() {
                    to_open = Some(path.clone());
                }
                ui.add(
                    egui::ProgressBar::new((*progress / 100.0) as f32)
                        .desired_width(200.0)
                        .text(format!("{:.1}%", progress)),
                );
            });
        }

        if let Some(path) = to_open {
            self.open_directory(path);
        }
    }

    fn render_contents(&mut self, ui: &mut egui::Ui) {
        let Some(directory) = self.current_directory.clone() else {
            return;
        };

        ui.horizontal(|ui| {
            ui.monospace(directory.display().to_string());
            if let Some(percent) = self.current_progress {
                ui.label(format!("({:.1}%)", percent));
            }
        });
        ui.separator();

        let Some(contents) = self.contents.clone() else {
            return;
        };

        if contents.subdirs.is_empty() && contents.files.is_empty() {
            ui.weak("Empty directory (or only excluded files).");
        }

        let mut action = None;
        for subdir in &contents.subdirs {
            ui.horizontal(|ui| {
                if ui.button(display_name(&subdir.path)).clicked() {
                    action = Some(RowAction::Open(subdir.path.clone()));
                }
                ui.add(
                    egui::ProgressBar::new((subdir.progress / 100.0) as f32)
                        .desired_width(200.0)
                        .text(format!("{:.1}%", subdir.progress)),
                );
            });
        }
        for file in &contents.files {
            let mut watched = file.watched;
            if ui.checkbox(&mut watched, display_name(&file.path)).changed() {
                action = Some(RowAction::Toggle(file.path.clone(), watched));
            }
        }

        match action {
            Some(RowAction::Open(path)) => self.open_directory(path),
            Some(RowAction::Toggle(path, watched)) => self.toggle_watched(&path, watched),
            None => {}
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl eframe::App for CourseTrackerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.process_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Course Tracker");
            ui.add_space(4.0);

            self.render_toolbar(ui);
            self.render_messages(ui);
            ui.separator();

            egui::ScrollArea::vertical()
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    if self.current_directory.is_some() {
                        self.render_contents(ui);
                    } else {
                        self.render_root_list(ui);
                    }
                });
        });

        if self.is_loading {
            ctx.request_repaint();
        }
    }
}
