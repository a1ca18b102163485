//! Demonstration route table.

use std::collections::BTreeMap;

use oxide_routing::{
    qualify, Bindings, Controller, ControllerRegistry, GroupSettings, Request, Resolver, Response,
    Result, RouteRegistry, RouterConfig,
};

/// Configuration used when no file is given.
pub fn default_config() -> RouterConfig {
    RouterConfig::default()
        .controllers_namespace("app::controllers")
        .shared_constraint("id", "[0-9]+")
        .shared_constraint("firstname|lastname", "[a-zA-Z]+")
}

/// Registers the demo controllers under `namespace`.
pub fn controllers(namespace: &str) -> ControllerRegistry {
    let mut controllers = ControllerRegistry::new();
    controllers
        .register::<RegisterController>(&qualify(&[namespace, "User::RegisterController"]))
        .register::<PostController>(&qualify(&[namespace, "Admin::PostController"]));
    controllers
}

/// Declares every demo route.
pub fn declare(routes: &mut RouteRegistry) -> Result<()> {
    routes.get("/", Resolver::handler(|_| Response::text("Homepage")))?;
    routes.get("/login", Resolver::handler(|_| Response::text("Show login form")))?;

    routes.put("/users/{id}", update_user())?;
    routes.patch("/users/{id}", update_user())?;

    routes.delete(
        "/posts/{id}",
        Resolver::handler_with(&["id"], |b| {
            Response::text(format!("Remove post with id #{}", arg(b, 0)))
        }),
    )?;

    // firstname and lastname are constrained by the shared table.
    routes.get(
        "/users/{firstname}/{lastname}",
        Resolver::handler_with(&["firstname", "lastname"], |b| {
            Response::text(format!("Full name: {} {}", arg(b, 0), arg(b, 1)))
        }),
    )?;

    routes.get(
        "/users/{id?}/username",
        Resolver::handler_with(&["id"], |b| match b.arg(0) {
            Some(id) => Response::text(format!("Username of an user with id={id}")),
            None => Response::text("Username of logged user"),
        }),
    )?;

    routes.group(
        GroupSettings::new()
            .prefix("dashboard/{dashboard_id?}")
            .constraint("dashboard_id", "[0-9]+")
            .default_value("dashboard_id", "4"),
        |group| {
            group.get(
                "/",
                Resolver::handler_with(&["dashboard_id"], |b| {
                    Response::text(format!("Dashboard #{}", arg(b, 0)))
                }),
            )?;
            group
                .get(
                    "posts/{pid}",
                    Resolver::handler_with(&["dashboard_id", "pid"], |b| {
                        Response::text(format!("Post id: {} on dashboard #{}", arg(b, 1), arg(b, 0)))
                    }),
                )?
                .with_constraints([("pid", "[0-9]+")]);
            Ok(())
        },
    )?;

    routes
        .get("/register/{form_id?}", "User::RegisterController@index")?
        .with_constraints([("form_id", "[0-9]+")])
        .with_defaults([("form_id", "2")]);
    routes.post("/register", "User::RegisterController@register")?;

    routes.group(
        GroupSettings::new().namespace("Admin").prefix("panel_22_3_admin"),
        |group| {
            group.get("posts/{id}", "PostController@show")?;
            group.post("/posts", "PostController@store")?;
            Ok(())
        },
    )?;

    routes.match_methods(
        &["put", "patch"],
        "/match/users/{id}",
        Resolver::handler_with(&["id"], |b| {
            Response::text(format!("Update user #{}", arg(b, 0)))
        }),
    )?;

    routes.any("/any", Resolver::handler(|_| Response::text("Any method route")))?;

    Ok(())
}

fn update_user() -> Resolver {
    Resolver::handler_with(&["id"], |b| {
        Response::text(format!(
            "Update user #{}. New details: {}",
            arg(b, 0),
            form_json(b.request())
        ))
    })
}

fn arg<'a>(bindings: &Bindings<'a>, index: usize) -> &'a str {
    bindings.arg(index).unwrap_or("null")
}

fn form_json(request: &Request) -> String {
    let details: BTreeMap<&str, &str> = request
        .form
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    serde_json::to_string(&details).unwrap_or_default()
}

#[derive(Default)]
struct RegisterController;

impl Controller for RegisterController {
    fn parameters(&self, action: &str) -> Option<&'static [&'static str]> {
        match action {
            "index" => Some(&["form_id"]),
            "register" => Some(&[]),
            _ => None,
        }
    }

    fn call(&mut self, action: &str, args: &Bindings<'_>) -> Option<Response> {
        match action {
            "index" => Some(Response::text(format!("Show register form #{}", arg(args, 0)))),
            "register" => Some(Response::text(format!(
                "Register user. Details: {}",
                form_json(args.request())
            ))),
            _ => None,
        }
    }
}

#[derive(Default)]
struct PostController;

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
            "show" => Some(Response::text(format!("Show post control page #{}", arg(args, 0)))),
            "store" => Some(Response::text(format!(
                "Store post. Details: {}",
                form_json(args.request())
            ))),
            _ => None,
        }
    }
}
