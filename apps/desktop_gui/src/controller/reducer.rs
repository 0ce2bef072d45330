//! Console state and the transitions driven by UI actions and backend events.
//!
//! The reducer never talks to the network. It queues [`BackendCommand`]s in an
//! outbox that the app flushes once per frame, and it folds [`UiEvent`]s back
//! into the mounted screen.

use client_core::{
    catalog::{filter_and_sort, ListCriteria, ProductSortKey, UserSortKey},
    forms::{
        parse_stock_delta, BalanceDraft, ProductDraft, ProductEditDraft, UserDraft,
    },
    view_state::{LoadState, MutationState},
    ClientError,
};
use shared::{
    domain::{Product, ProductId, User, UserId},
    error::ValidationError,
};

use crate::backend_bridge::commands::{BackendCommand, LoadRequest, Mutation, ViewTicket};
use crate::controller::{
    events::{Loaded, MutationOutcome, UiError, UiErrorCategory, UiErrorContext, UiEvent},
    routes::Route,
};

pub const OPERATION_COMPLETED: &str = "Operation completed!";
pub const OPERATION_FAILED: &str = "Operation failed";

#[derive(Debug, Default)]
pub struct UsersScreen {
    pub load: LoadState<Vec<User>>,
    pub criteria: ListCriteria<UserSortKey>,
}

impl UsersScreen {
    pub fn visible(&self) -> Option<Vec<&User>> {
        self.load
            .ready()
            .map(|users| filter_and_sort(users, &self.criteria))
    }
}

#[derive(Debug, Default)]
pub struct ProductsScreen {
    pub load: LoadState<Vec<Product>>,
    pub criteria: ListCriteria<ProductSortKey>,
}

impl ProductsScreen {
    pub fn visible(&self) -> Option<Vec<&Product>> {
        self.load
            .ready()
            .map(|products| filter_and_sort(products, &self.criteria))
    }
}

#[derive(Debug, Default)]
pub struct CreateUserScreen {
    pub draft: UserDraft,
    pub mutation: MutationState,
}

#[derive(Debug, Default)]
pub struct CreateProductScreen {
    pub draft: ProductDraft,
    pub mutation: MutationState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDialog {
    pub success: bool,
    pub message: String,
}

#[derive(Debug)]
pub struct DepositScreen {
    pub user_id: UserId,
    pub load: LoadState<User>,
    pub draft: BalanceDraft,
    pub mutation: MutationState,
    pub dialog: Option<OperationDialog>,
}

#[derive(Debug)]
pub struct EditProductScreen {
    pub product_id: ProductId,
    pub load: LoadState<Product>,
    pub draft: ProductEditDraft,
    pub mutation: MutationState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockEditor {
    pub product_id: ProductId,
    pub delta: String,
}

#[derive(Debug, Default)]
pub struct StockScreen {
    pub load: LoadState<Vec<Product>>,
    pub editor: Option<StockEditor>,
    pub adjustment: MutationState,
}

#[derive(Debug)]
pub enum Screen {
    Users(UsersScreen),
    Products(ProductsScreen),
    CreateUser(CreateUserScreen),
    CreateProduct(CreateProductScreen),
    Deposit(DepositScreen),
    EditProduct(EditProductScreen),
    Stock(StockScreen),
}

impl Screen {
    /// A fresh screen for `route` plus the fetch it needs, if any.
    fn mount(route: &Route) -> (Screen, Option<LoadRequest>) {
        match route {
            Route::Users => (Screen::Users(UsersScreen::default()), Some(LoadRequest::Users)),
            Route::Products => (
                Screen::Products(ProductsScreen::default()),
                Some(LoadRequest::Products),
            ),
            Route::Stock => (Screen::Stock(StockScreen::default()), Some(LoadRequest::Products)),
            Route::CreateUser => (Screen::CreateUser(CreateUserScreen::default()), None),
            Route::CreateProduct => (Screen::CreateProduct(CreateProductScreen::default()), None),
            Route::Deposit(id) => (
                Screen::Deposit(DepositScreen {
                    user_id: id.clone(),
                    load: LoadState::Loading,
                    draft: BalanceDraft::default(),
                    mutation: MutationState::Idle,
                    dialog: None,
                }),
                Some(LoadRequest::User(id.clone())),
            ),
            Route::EditProduct(id) => (
                Screen::EditProduct(EditProductScreen {
                    product_id: id.clone(),
                    load: LoadState::Loading,
                    draft: ProductEditDraft::default(),
                    mutation: MutationState::Idle,
                }),
                Some(LoadRequest::Product(id.clone())),
            ),
        }
    }

    fn fail_load(&mut self, err: ClientError) {
        match self {
            Screen::Users(screen) => {
                screen.load.resolve(Err(err));
            }
            Screen::Products(screen) => {
                screen.load.resolve(Err(err));
            }
            Screen::Stock(screen) => {
                screen.load.resolve(Err(err));
            }
            Screen::Deposit(screen) => {
                screen.load.resolve(Err(err));
            }
            Screen::EditProduct(screen) => {
                screen.load.resolve(Err(err));
            }
            Screen::CreateUser(_) | Screen::CreateProduct(_) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Navigate(Route),
    SubmitCreateUser,
    SubmitCreateProduct,
    SubmitProductEdit,
    SubmitBalanceChange,
    CloseDialog,
    OpenStockEditor(ProductId),
    CloseStockEditor,
    ConfirmStockEditor,
}

pub struct Console {
    route: Route,
    ticket: ViewTicket,
    next_ticket: u64,
    screen: Screen,
    outbox: Vec<BackendCommand>,
    status: String,
    last_error: Option<UiError>,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Starts on the user list with its fetch already queued.
    pub fn new() -> Self {
        let route = Route::Users;
        let ticket = ViewTicket(1);
        let (screen, load) = Screen::mount(&route);
        let outbox = load
            .map(|request| vec![BackendCommand::Load { ticket, request }])
            .unwrap_or_default();
        Self {
            route,
            ticket,
            next_ticket: 1,
            screen,
            outbox,
            status: String::new(),
            last_error: None,
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn ticket(&self) -> ViewTicket {
        self.ticket
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut String {
        &mut self.status
    }

    pub fn last_error(&self) -> Option<&UiError> {
        self.last_error.as_ref()
    }

    pub fn take_commands(&mut self) -> Vec<BackendCommand> {
        std::mem::take(&mut self.outbox)
    }

    /// Unmounts the current screen, cancelling its tasks, and mounts `route`
    /// under a new ticket.
    pub fn navigate(&mut self, route: Route) {
        self.outbox.push(BackendCommand::CancelView {
            ticket: self.ticket,
        });
        self.next_ticket += 1;
        self.ticket = ViewTicket(self.next_ticket);

        let (screen, load) = Screen::mount(&route);
        self.screen = screen;
        self.route = route;
        self.last_error = None;
        if let Some(request) = load {
            self.outbox.push(BackendCommand::Load {
                ticket: self.ticket,
                request,
            });
        }
        tracing::debug!(route = %self.route, ticket = self.ticket.0, "mounted screen");
    }

    pub fn navigate_path(&mut self, path: &str) {
        match Route::parse(path) {
            Some(route) => self.navigate(route),
            None => {
                tracing::warn!("unknown route {path:?}; showing users");
                self.navigate(Route::Users);
                self.status = format!("Unknown page {path}");
            }
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Navigate(route) => self.navigate(route),
            Action::SubmitCreateUser => self.submit_create_user(),
            Action::SubmitCreateProduct => self.submit_create_product(),
            Action::SubmitProductEdit => self.submit_product_edit(),
            Action::SubmitBalanceChange => self.submit_balance_change(),
            Action::CloseDialog => self.close_dialog(),
            Action::OpenStockEditor(product_id) => {
                if let Screen::Stock(screen) = &mut self.screen {
                    screen.editor = Some(StockEditor {
                        product_id,
                        delta: String::new(),
                    });
                }
            }
            Action::CloseStockEditor => {
                if let Screen::Stock(screen) = &mut self.screen {
                    screen.editor = None;
                }
            }
            Action::ConfirmStockEditor => self.confirm_stock_editor(),
        }
    }

    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::Info(message) => self.status = message,
            UiEvent::Error(err) => {
                self.status = format!("{}: {}", err.label(), err.message());
                self.last_error = Some(err);
            }
            UiEvent::Loaded { ticket, result } => {
                if self.is_stale(ticket, "load") {
                    return;
                }
                self.apply_loaded(result);
            }
            UiEvent::MutationFinished { ticket, result } => {
                if self.is_stale(ticket, "mutation") {
                    return;
                }
                self.apply_mutation(result);
            }
        }
    }

    fn is_stale(&self, ticket: ViewTicket, kind: &'static str) -> bool {
        let stale = ticket != self.ticket;
        if stale {
            tracing::debug!(
                kind,
                event_ticket = ticket.0,
                current_ticket = self.ticket.0,
                "dropping result for a screen that is gone"
            );
        }
        stale
    }

    fn apply_loaded(&mut self, result: Result<Loaded, ClientError>) {
        let loaded = match result {
            Ok(loaded) => loaded,
            Err(err) => {
                tracing::warn!(route = %self.route, "load failed: {err}");
                self.last_error = Some(self.load_error(&err));
                self.screen.fail_load(err);
                return;
            }
        };

        match (&mut self.screen, loaded) {
            (Screen::Users(screen), Loaded::Users(users)) => {
                screen.load.resolve(Ok(users));
            }
            (Screen::Products(screen), Loaded::Products(products)) => {
                screen.load.resolve(Ok(products));
            }
            (Screen::Stock(screen), Loaded::Products(products)) => {
                screen.load.resolve(Ok(products));
            }
            (Screen::Deposit(screen), Loaded::User(user)) => {
                screen.load.resolve(Ok(user));
            }
            (Screen::EditProduct(screen), Loaded::Product(product)) => {
                if screen.load.is_loading() {
                    screen.draft = ProductEditDraft::from_product(&product);
                }
                screen.load.resolve(Ok(product));
            }
            (_, other) => {
                tracing::warn!(route = %self.route, "ignoring load result of the wrong shape: {other:?}");
            }
        }
    }

    fn load_error(&self, err: &ClientError) -> UiError {
        let missing = match &self.route {
            Route::Deposit(id) if err.is_not_found() => format!("user {id} does not exist"),
            Route::EditProduct(id) if err.is_not_found() => format!("product {id} does not exist"),
            _ => return UiError::from_client(UiErrorContext::Load, err),
        };
        UiError::new(UiErrorCategory::Http, UiErrorContext::Load, missing)
    }

    fn apply_mutation(&mut self, result: Result<MutationOutcome, ClientError>) {
        let mut next_route = None;
        match &mut self.screen {
            Screen::CreateUser(screen) => {
                screen.mutation.finish(&result);
                if result.is_ok() {
                    self.status = "User created".to_string();
                    next_route = Some(Route::Users);
                }
            }
            Screen::CreateProduct(screen) => {
                screen.mutation.finish(&result);
                if result.is_ok() {
                    self.status = "Product created".to_string();
                    next_route = Some(Route::Products);
                }
            }
            Screen::EditProduct(screen) => {
                screen.mutation.finish(&result);
                if result.is_ok() {
                    self.status = "Product updated".to_string();
                    next_route = Some(Route::Products);
                }
            }
            Screen::Deposit(screen) => {
                screen.mutation.finish(&result);
                screen.dialog = Some(match &result {
                    Ok(outcome) => {
                        // The held balance stays as fetched; the user list
                        // re-reads it after the dialog closes.
                        let message = match outcome {
                            MutationOutcome::BalanceChanged { message, .. } => message.clone(),
                            _ => None,
                        };
                        screen.draft.amount.clear();
                        OperationDialog {
                            success: true,
                            message: message.unwrap_or_else(|| OPERATION_COMPLETED.to_string()),
                        }
                    }
                    Err(err) => OperationDialog {
                        success: false,
                        message: err
                            .server_message()
                            .unwrap_or(OPERATION_FAILED)
                            .to_string(),
                    },
                });
            }
            Screen::Stock(screen) => {
                screen.adjustment.finish(&result);
                if let Ok(MutationOutcome::StockAdjusted { product_id, delta }) = &result {
                    let held = screen
                        .load
                        .ready_mut()
                        .and_then(|products| products.iter_mut().find(|p| &p.id == product_id));
                    if let Some(product) = held {
                        product.apply_stock_delta(*delta);
                    }
                    screen.adjustment = MutationState::Idle;
                    self.status = "Stock updated".to_string();
                }
            }
            Screen::Users(_) | Screen::Products(_) => {
                tracing::warn!(route = %self.route, "mutation result arrived on a list screen");
            }
        }

        match &result {
            Ok(_) => self.last_error = None,
            Err(err) => {
                tracing::warn!(route = %self.route, "submit failed: {err}");
                self.last_error = Some(UiError::from_client(UiErrorContext::Submit, err));
            }
        }
        if let Some(route) = next_route {
            self.navigate(route);
        }
    }

    fn submit_create_user(&mut self) {
        let Screen::CreateUser(screen) = &mut self.screen else {
            return;
        };
        let parsed = screen.draft.to_payload();
        if let Some(mutation) = prepare(&mut screen.mutation, parsed, Mutation::CreateUser) {
            self.queue_submit(mutation);
        }
    }

    fn submit_create_product(&mut self) {
        let Screen::CreateProduct(screen) = &mut self.screen else {
            return;
        };
        let parsed = screen.draft.to_payload();
        if let Some(mutation) = prepare(&mut screen.mutation, parsed, Mutation::CreateProduct) {
            self.queue_submit(mutation);
        }
    }

    fn submit_product_edit(&mut self) {
        let Screen::EditProduct(screen) = &mut self.screen else {
            return;
        };
        if screen.load.ready().is_none() {
            return;
        }
        let product_id = screen.product_id.clone();
        let parsed = screen.draft.to_payload();
        if let Some(mutation) = prepare(&mut screen.mutation, parsed, |update| {
            Mutation::UpdateProduct { product_id, update }
        }) {
            self.queue_submit(mutation);
        }
    }

    fn submit_balance_change(&mut self) {
        let Screen::Deposit(screen) = &mut self.screen else {
            return;
        };
        if screen.load.ready().is_none() || screen.dialog.is_some() {
            return;
        }
        let user_id = screen.user_id.clone();
        let parsed = screen.draft.to_payload();
        if let Err(err) = &parsed {
            screen.dialog = Some(OperationDialog {
                success: false,
                message: err.to_string(),
            });
        }
        if let Some(mutation) = prepare(&mut screen.mutation, parsed, |change| {
            Mutation::ChangeBalance { user_id, change }
        }) {
            self.queue_submit(mutation);
        }
    }

    fn close_dialog(&mut self) {
        let Screen::Deposit(screen) = &mut self.screen else {
            return;
        };
        if let Some(dialog) = screen.dialog.take() {
            if dialog.success {
                self.navigate(Route::Users);
            }
        }
    }

    /// An empty, non-numeric or non-positive delta just closes the editor.
    fn confirm_stock_editor(&mut self) {
        let Screen::Stock(screen) = &mut self.screen else {
            return;
        };
        let Some(editor) = screen.editor.take() else {
            return;
        };
        let adjustment = match parse_stock_delta(&editor.delta) {
            Ok(adjustment) => adjustment,
            Err(err) => {
                tracing::debug!("stock editor closed without a request: {err}");
                return;
            }
        };
        if !screen.adjustment.begin_submit() {
            self.status = "A stock adjustment is already in progress".to_string();
            return;
        }
        self.queue_submit(Mutation::AdjustStock {
            product_id: editor.product_id,
            adjustment,
        });
    }

    fn queue_submit(&mut self, mutation: Mutation) {
        self.outbox.push(BackendCommand::Submit {
            ticket: self.ticket,
            mutation,
        });
    }
}

/// Validation failures stay on the form; a valid draft moves the form to
/// `Submitting` and yields the command payload.
fn prepare<T>(
    state: &mut MutationState,
    parsed: Result<T, ValidationError>,
    into: impl FnOnce(T) -> Mutation,
) -> Option<Mutation> {
    if !state.can_submit() {
        return None;
    }
    match parsed {
        Ok(payload) => {
            state.begin_submit();
            Some(into(payload))
        }
        Err(err) => {
            state.reject(ClientError::from(err));
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
