use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiErrorCategory, UiErrorContext, UiEvent},
    orchestration::flush_commands,
    reducer::{Action, Console, Screen},
    routes::Route,
};
use crate::ui::screens;

const ERROR_TEXT: egui::Color32 = egui::Color32::from_rgb(220, 80, 80);

pub struct ConsoleApp {
    console: Console,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    api_base_url: String,
}

impl ConsoleApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        api_base_url: String,
        start_path: Option<&str>,
    ) -> Self {
        let mut console = Console::new();
        if let Some(path) = start_path {
            console.navigate_path(path);
        }
        Self {
            console,
            cmd_tx,
            ui_rx,
            api_base_url,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.console.apply(event);
        }
    }

    fn show_navigation(&self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        egui::SidePanel::left("navigation_panel")
            .resizable(false)
            .default_width(170.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.heading("Cantina");
                ui.separator();
                let current = self.console.route().parent();
                for (route, label) in Route::NAVIGATION {
                    let selected = current == route;
                    if ui.selectable_label(selected, label).clicked() && !selected {
                        actions.push(Action::Navigate(route));
                    }
                }
            });
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.weak(&self.api_base_url);
                    ui.separator();
                    ui.weak(self.console.route().path());
                    ui.separator();
                    match self.console.last_error() {
                        Some(err) => {
                            let hint = match (err.context(), err.category()) {
                                (UiErrorContext::BackendStartup, _) => " (restart the console)",
                                (_, UiErrorCategory::Transport) => " (is the backend running?)",
                                _ => "",
                            };
                            ui.colored_label(
                                ERROR_TEXT,
                                format!("{}: {}{hint}", err.label(), err.message()),
                            );
                        }
                        None => {
                            ui.label(self.console.status());
                        }
                    }
                });
            });
    }

    fn show_screen(&mut self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match self.console.screen_mut() {
                Screen::Users(screen) => screens::users(ui, screen, actions),
                Screen::Products(screen) => screens::products(ui, screen, actions),
                Screen::CreateUser(screen) => screens::create_user(ui, screen, actions),
                Screen::CreateProduct(screen) => screens::create_product(ui, screen, actions),
                Screen::Deposit(screen) => screens::deposit(ui, screen, actions),
                Screen::EditProduct(screen) => screens::edit_product(ui, screen, actions),
                Screen::Stock(screen) => screens::stock(ui, screen, actions),
            });
        });

        if let Screen::Deposit(screen) = self.console.screen() {
            if let Some(dialog) = &screen.dialog {
                screens::operation_dialog(ctx, dialog, actions);
            }
        }
    }
}

impl eframe::App for ConsoleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let mut actions = Vec::new();
        self.show_navigation(ctx, &mut actions);
        self.show_status_bar(ctx);
        self.show_screen(ctx, &mut actions);

        for action in actions {
            self.console.dispatch(action);
        }
        flush_commands(&mut self.console, &self.cmd_tx);

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
