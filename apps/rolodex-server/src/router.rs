use std::mem;

use axum::{
    handler::Handler,
    routing::{delete, get, post, put},
    Router,
};

use crate::{api, AppState};

pub(crate) struct RouterBuilder {
    router: Router<AppState>,
    endpoints: Vec<String>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            endpoints: Vec::new(),
        }
    }

    fn record(&mut self, method: &str, path: &'static str) {
        self.endpoints.push(format!("{} {}", method, path));
    }

    pub fn route_get<H, T>(&mut self, path: &'static str, handler: H) -> &mut Self
    where
        H: Handler<T, AppState> + Clone + 'static,
        T: Send + 'static,
    {
        self.record("GET", path);
        let router = mem::take(&mut self.router);
        self.router = router.route(path, get(handler));
        self
    }

    pub fn route_post<H, T>(&mut self, path: &'static str, handler: H) -> &mut Self
    where
        H: Handler<T, AppState> + Clone + 'static,
        T: Send + 'static,
    {
        self.record("POST", path);
        let router = mem::take(&mut self.router);
        self.router = router.route(path, post(handler));
        self
    }

    pub fn route_put<H, T>(&mut self, path: &'static str, handler: H) -> &mut Self
    where
        H: Handler<T, AppState> + Clone + 'static,
        T: Send + 'static,
    {
        self.record("PUT", path);
        let router = mem::take(&mut self.router);
        self.router = router.route(path, put(handler));
        self
    }

    pub fn route_delete<H, T>(&mut self, path: &'static str, handler: H) -> &mut Self
    where
        H: Handler<T, AppState> + Clone + 'static,
        T: Send + 'static,
    {
        self.record("DELETE", path);
        let router = mem::take(&mut self.router);
        self.router = router.route(path, delete(handler));
        self
    }

    pub fn build(self) -> (Router<AppState>, Vec<String>) {
        (self.router, self.endpoints)
    }
}

pub(crate) mod paths {
    pub const HEALTHZ: &str = "/healthz";
    pub const ABOUT: &str = "/about";
    pub const CONTACT: &str = "/contact";
    pub const CONTACT_ADD: &str = "/contact/add";
    pub const CONTACT_EDIT: &str = "/contact/edit/{name}";
    pub const CONTACT_DETAIL: &str = "/contact/{name}";
}

pub(crate) fn build_router() -> (Router<AppState>, Vec<String>) {
    let mut builder = RouterBuilder::new();
    builder.route_get(paths::HEALTHZ, api::meta::healthz);
    builder.route_get(paths::ABOUT, api::meta::about);
    builder.route_get(paths::CONTACT, api::contacts::contact_list);
    builder.route_post(paths::CONTACT, api::contacts::contact_create);
    builder.route_put(paths::CONTACT, api::contacts::contact_update);
    builder.route_delete(paths::CONTACT, api::contacts::contact_delete);
    builder.route_get(paths::CONTACT_ADD, api::contacts::contact_add_form);
    builder.route_get(paths::CONTACT_EDIT, api::contacts::contact_edit_form);
    builder.route_get(paths::CONTACT_DETAIL, api::contacts::contact_detail);
    builder.build()
}
