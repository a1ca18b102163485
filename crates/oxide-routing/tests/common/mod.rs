#![allow(dead_code)]

use oxide_routing::{
    Bindings, Controller, ControllerRegistry, Dispatcher, Request, Resolver, Response,
    RouteRegistry, RouterConfig,
};

pub const NAMESPACE: &str = "app::controllers";

pub fn config() -> RouterConfig {
    RouterConfig::default()
        .controllers_namespace(NAMESPACE)
        .shared_constraint("id", "[0-9]+")
        .shared_constraint("firstname|lastname", "[a-zA-Z]+")
}

/// Handler that renders its positional arguments as `name=value` pairs.
pub fn echo(params: &'static [&'static str]) -> Resolver {
    Resolver::handler_with(params, move |b| {
        let rendered: Vec<String> = params
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{name}={}", b.arg(i).unwrap_or("null")))
            .collect();
        Response::text(rendered.join(","))
    })
}

pub fn text(body: &'static str) -> Resolver {
    Resolver::handler(move |_| Response::text(body))
}

pub fn build(declare: impl FnOnce(&mut RouteRegistry)) -> Dispatcher {
    let mut routes = RouteRegistry::new(config());
    declare(&mut routes);
    Dispatcher::new(routes, controllers()).unwrap_or_else(|e| panic!("Failed to build: {e}"))
}

pub fn controllers() -> ControllerRegistry {
    let mut controllers = ControllerRegistry::new();
    controllers
        .register::<PostController>("app::controllers::Admin::PostController")
        .register::<RegisterController>("app::controllers::User::RegisterController");
    controllers
}

pub fn body(dispatcher: &Dispatcher, request: &Request) -> String {
    let response = dispatcher.dispatch(request);
    assert_eq!(response.status, 200, "{} {}", request.method, request.path);
    response.body.unwrap_or_default()
}

#[derive(Default)]
pub struct PostController;

impl Controller for PostController {
    fn parameters(&self, action: &str) -> Option<&'static [&'static str]> {
        match action {
            "show" => Some(&["id"]),
            "store" => Some(&[]),
            _ => None,
        }
    }

    fn call(&mut self, action: &str, args: &Bindings<'_>) -> Option<Response> {
        match action {
            "show" => Some(Response::text(format!(
                "Show post #{}",
                args.arg(0).unwrap_or("null")
            ))),
            "store" => Some(Response::text(format!(
                "Store post {}",
                args.request().get_form("title").unwrap_or_default()
            ))),
            _ => None,
        }
    }
}

#[derive(Default)]
pub struct RegisterController;

impl Controller for RegisterController {
    fn parameters(&self, action: &str) -> Option<&'static [&'static str]> {
        match action {
            "index" => Some(&["form_id"]),
            _ => None,
        }
    }

    fn call(&mut self, action: &str, args: &Bindings<'_>) -> Option<Response> {
        match action {
            "index" => Some(Response::text(format!(
                "Register form #{}",
                args.arg(0).unwrap_or("null")
            ))),
            _ => None,
        }
    }
}
