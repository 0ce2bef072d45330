//! One render function per screen. Renderers only edit drafts and criteria in
//! place; anything that needs the backend is pushed as an [`Action`].

use client_core::{
    catalog::{ListCriteria, ProductSortKey, UserSortKey},
    view_state::{LoadState, MutationState},
    ClientError,
};
use eframe::egui;
use shared::domain::{BalanceOperation, Role};

use crate::controller::{
    reducer::{
        Action, CreateProductScreen, CreateUserScreen, DepositScreen, EditProductScreen,
        OperationDialog, ProductsScreen, StockScreen, UsersScreen,
    },
    routes::Route,
};

const ERROR_TEXT: egui::Color32 = egui::Color32::from_rgb(220, 80, 80);
const LOW_STOCK_TEXT: egui::Color32 = egui::Color32::from_rgb(230, 150, 40);
const SUCCESS_TEXT: egui::Color32 = egui::Color32::from_rgb(90, 180, 110);

fn error_text(err: &ClientError) -> String {
    err.server_message()
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string())
}

fn field_label(ui: &mut egui::Ui, label: &str, invalid: bool) {
    let text = egui::RichText::new(label).strong();
    if invalid {
        ui.label(text.color(ERROR_TEXT));
    } else {
        ui.label(text);
    }
}

/// `invalid` marks the field the last rejected submit complained about.
fn text_field(
    ui: &mut egui::Ui,
    id: &'static str,
    label: &str,
    hint: &str,
    value: &mut String,
    invalid: bool,
) {
    field_label(ui, label, invalid);
    ui.add(
        egui::TextEdit::singleline(value)
            .id_salt(id)
            .hint_text(hint)
            .desired_width(280.0),
    );
    ui.end_row();
}

/// Renders the loading placeholder or the load error. Returns the value once
/// ready.
fn loaded<'a, T>(ui: &mut egui::Ui, load: &'a LoadState<T>) -> Option<&'a T> {
    match load {
        LoadState::Loading => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading...");
            });
            None
        }
        LoadState::Failed(err) => {
            ui.colored_label(ERROR_TEXT, error_text(err));
            None
        }
        LoadState::Ready(value) => Some(value),
    }
}

fn list_controls<K: Copy + PartialEq>(
    ui: &mut egui::Ui,
    id: &'static str,
    criteria: &mut ListCriteria<K>,
    keys: &[K],
    label: fn(K) -> &'static str,
) {
    ui.push_id(id, |ui| {
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut criteria.query)
                    .id_salt("query")
                    .hint_text("Search")
                    .desired_width(220.0),
            );
            ui.label("Sort by");
            egui::ComboBox::from_id_salt("sort_key")
                .selected_text(label(criteria.sort_key))
                .show_ui(ui, |ui| {
                    for key in keys {
                        ui.selectable_value(&mut criteria.sort_key, *key, label(*key));
                    }
                });
            let direction = if criteria.ascending {
                "Ascending"
            } else {
                "Descending"
            };
            if ui.button(direction).clicked() {
                criteria.toggle_direction();
            }
        });
    });
    ui.add_space(6.0);
}

fn submit_row(ui: &mut egui::Ui, mutation: &MutationState, label: &str) -> bool {
    let mut clicked = false;
    ui.horizontal(|ui| {
        clicked = ui
            .add_enabled(mutation.can_submit(), egui::Button::new(label))
            .clicked();
        if mutation.is_busy() {
            ui.spinner();
        }
    });
    if let Some(err) = mutation.error() {
        ui.colored_label(ERROR_TEXT, error_text(err));
    }
    clicked
}

pub fn users(ui: &mut egui::Ui, screen: &mut UsersScreen, actions: &mut Vec<Action>) {
    ui.heading("Users");
    if loaded(ui, &screen.load).is_none() {
        return;
    }
    list_controls(
        ui,
        "users_criteria",
        &mut screen.criteria,
        &UserSortKey::ALL,
        UserSortKey::label,
    );
    let rows = screen.visible().unwrap_or_default();
    if rows.is_empty() {
        ui.weak("No users found.");
        return;
    }

    egui::Grid::new("users_table")
        .striped(true)
        .num_columns(6)
        .show(ui, |ui| {
            for header in ["Name", "Nickname", "Room", "Role", "Balance", ""] {
                ui.strong(header);
            }
            ui.end_row();
            for user in rows {
                ui.label(user.full_name());
                ui.label(user.nickname.as_deref().unwrap_or("-"));
                ui.label(&user.room);
                ui.label(user.role_label());
                ui.label(user.balance.to_string());
                if ui.small_button("Deposit").clicked() {
                    actions.push(Action::Navigate(Route::Deposit(user.id.clone())));
                }
                ui.end_row();
            }
        });
}

pub fn products(ui: &mut egui::Ui, screen: &mut ProductsScreen, actions: &mut Vec<Action>) {
    ui.heading("Products");
    if loaded(ui, &screen.load).is_none() {
        return;
    }
    list_controls(
        ui,
        "products_criteria",
        &mut screen.criteria,
        &ProductSortKey::ALL,
        ProductSortKey::label,
    );
    let rows = screen.visible().unwrap_or_default();
    if rows.is_empty() {
        ui.weak("No products found.");
        return;
    }

    egui::Grid::new("products_table")
        .striped(true)
        .num_columns(5)
        .show(ui, |ui| {
            for header in ["Name", "Kind", "Quantity", "Price", ""] {
                ui.strong(header);
            }
            ui.end_row();
            for product in rows {
                ui.label(&product.name);
                ui.label(&product.kind);
                ui.label(product.quantity.to_string());
                ui.label(product.price.to_string());
                if ui.small_button("Edit").clicked() {
                    actions.push(Action::Navigate(Route::EditProduct(product.id.clone())));
                }
                ui.end_row();
            }
        });
}

pub fn create_user(ui: &mut egui::Ui, screen: &mut CreateUserScreen, actions: &mut Vec<Action>) {
    ui.heading("New user");
    ui.add_space(6.0);
    let flagged = screen.mutation.invalid_field();
    let draft = &mut screen.draft;
    egui::Grid::new("create_user_form")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            text_field(
                ui,
                "user_first_name",
                "First name",
                "Required",
                &mut draft.first_name,
                flagged == Some("first name"),
            );
            text_field(
                ui,
                "user_last_name",
                "Surname",
                "Required",
                &mut draft.last_name,
                flagged == Some("surname"),
            );
            text_field(
                ui,
                "user_nickname",
                "Nickname",
                "Optional",
                &mut draft.nickname,
                false,
            );
            text_field(
                ui,
                "user_room",
                "Room",
                "Required",
                &mut draft.room,
                flagged == Some("room"),
            );

            field_label(ui, "Role", flagged == Some("role"));
            egui::ComboBox::from_id_salt("user_role")
                .selected_text(draft.role.label())
                .show_ui(ui, |ui| {
                    for role in Role::ALL {
                        ui.selectable_value(&mut draft.role, role, role.label());
                    }
                });
            ui.end_row();

            text_field(
                ui,
                "user_initial_balance",
                "Initial balance",
                "0,00",
                &mut draft.initial_balance,
                flagged == Some("initial balance"),
            );
        });
    ui.add_space(8.0);
    if submit_row(ui, &screen.mutation, "Create user") {
        actions.push(Action::SubmitCreateUser);
    }
}

pub fn create_product(
    ui: &mut egui::Ui,
    screen: &mut CreateProductScreen,
    actions: &mut Vec<Action>,
) {
    ui.heading("New product");
    ui.add_space(6.0);
    let flagged = screen.mutation.invalid_field();
    let draft = &mut screen.draft;
    egui::Grid::new("create_product_form")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            let name_bad = flagged == Some("name");
            text_field(ui, "product_name", "Name", "Required", &mut draft.name, name_bad);
            let quantity_bad = flagged == Some("quantity");
            text_field(ui, "product_quantity", "Quantity", "0", &mut draft.quantity, quantity_bad);
            let kind_bad = flagged == Some("type");
            text_field(ui, "product_kind", "Kind", "Required", &mut draft.kind, kind_bad);
            let price_bad = flagged == Some("price");
            text_field(ui, "product_price", "Price", "0,00", &mut draft.price, price_bad);
        });
    ui.add_space(8.0);
    if submit_row(ui, &screen.mutation, "Create product") {
        actions.push(Action::SubmitCreateProduct);
    }
}

pub fn deposit(ui: &mut egui::Ui, screen: &mut DepositScreen, actions: &mut Vec<Action>) {
    let Some(user) = loaded(ui, &screen.load) else {
        return;
    };

    ui.horizontal(|ui| {
        let initial = user.initial().map(String::from).unwrap_or_default();
        ui.label(egui::RichText::new(initial).size(36.0).strong());
        ui.vertical(|ui| {
            ui.heading(user.full_name());
            ui.weak(format!("{} · room {}", user.role_label(), user.room));
        });
    });
    ui.label(format!("Current balance: {}", user.balance));
    ui.separator();

    let amount_bad = screen.mutation.invalid_field() == Some("amount");
    let draft = &mut screen.draft;
    ui.horizontal(|ui| {
        for operation in [BalanceOperation::Deposit, BalanceOperation::Withdraw] {
            ui.radio_value(&mut draft.operation, operation, operation.label());
        }
    });
    ui.horizontal(|ui| {
        field_label(ui, "Amount", amount_bad);
        ui.add(
            egui::TextEdit::singleline(&mut draft.amount)
                .id_salt("balance_amount")
                .hint_text("0,00")
                .desired_width(160.0),
        );
    });
    ui.add_space(8.0);

    let enabled = screen.mutation.can_submit() && screen.dialog.is_none();
    ui.horizontal(|ui| {
        if ui
            .add_enabled(enabled, egui::Button::new(draft.operation.label()))
            .clicked()
        {
            actions.push(Action::SubmitBalanceChange);
        }
        if screen.mutation.is_busy() {
            ui.spinner();
        }
        if ui.button("Back").clicked() {
            actions.push(Action::Navigate(Route::Users));
        }
    });
}

pub fn operation_dialog(ctx: &egui::Context, dialog: &OperationDialog, actions: &mut Vec<Action>) {
    egui::Window::new("operation_dialog")
        .title_bar(false)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            let (color, title) = if dialog.success {
                (SUCCESS_TEXT, "Success")
            } else {
                (ERROR_TEXT, "Error")
            };
            ui.colored_label(color, egui::RichText::new(title).strong());
            ui.label(&dialog.message);
            ui.add_space(6.0);
            if ui.button("OK").clicked() {
                actions.push(Action::CloseDialog);
            }
        });
}

pub fn edit_product(ui: &mut egui::Ui, screen: &mut EditProductScreen, actions: &mut Vec<Action>) {
    if loaded(ui, &screen.load).is_none() {
        return;
    }

    ui.heading("Edit product");
    ui.add_space(6.0);
    let flagged = screen.mutation.invalid_field();
    let draft = &mut screen.draft;
    egui::Grid::new("edit_product_form")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            let name_bad = flagged == Some("name");
            text_field(ui, "edit_product_name", "Name", "Required", &mut draft.name, name_bad);
            let kind_bad = flagged == Some("type");
            text_field(ui, "edit_product_kind", "Kind", "Required", &mut draft.kind, kind_bad);
            let price_bad = flagged == Some("price");
            text_field(ui, "edit_product_price", "Price", "0,00", &mut draft.price, price_bad);
            ui.label(egui::RichText::new("Quantity").strong());
            ui.label(format!("{} (change it on the stock page)", draft.quantity));
            ui.end_row();
        });
    ui.add_space(8.0);
    if submit_row(ui, &screen.mutation, "Save") {
        actions.push(Action::SubmitProductEdit);
    }
    if ui.button("Cancel").clicked() {
        actions.push(Action::Navigate(Route::Products));
    }
}

pub fn stock(ui: &mut egui::Ui, screen: &mut StockScreen, actions: &mut Vec<Action>) {
    ui.heading("Stock");
    let Some(products) = loaded(ui, &screen.load) else {
        return;
    };
    if products.is_empty() {
        ui.weak("No products found.");
        return;
    }

    let busy = screen.adjustment.is_busy();
    if busy {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Updating stock...");
        });
    }
    if let Some(err) = screen.adjustment.error() {
        ui.colored_label(ERROR_TEXT, error_text(err));
    }

    let editor = &mut screen.editor;
    egui::Grid::new("stock_table")
        .striped(true)
        .num_columns(4)
        .show(ui, |ui| {
            for header in ["Name", "Kind", "Quantity", ""] {
                ui.strong(header);
            }
            ui.end_row();
            for product in products {
                ui.label(&product.name);
                ui.label(&product.kind);
                let quantity = product.quantity.to_string();
                if product.is_low_stock() {
                    ui.colored_label(LOW_STOCK_TEXT, format!("{quantity} (low)"));
                } else {
                    ui.label(quantity);
                }

                match editor.as_mut() {
                    Some(open) if open.product_id == product.id => {
                        ui.horizontal(|ui| {
                            ui.add(
                                egui::TextEdit::singleline(&mut open.delta)
                                    .id_salt("stock_delta")
                                    .hint_text("Add")
                                    .desired_width(60.0),
                            );
                            if ui.small_button("Confirm").clicked() {
                                actions.push(Action::ConfirmStockEditor);
                            }
                            if ui.small_button("Cancel").clicked() {
                                actions.push(Action::CloseStockEditor);
                            }
                        });
                    }
                    _ => {
                        if ui
                            .add_enabled(!busy, egui::Button::new("Add stock").small())
                            .clicked()
                        {
                            actions.push(Action::OpenStockEditor(product.id.clone()));
                        }
                    }
                }
                ui.end_row();
            }
        });
}
