use crate::dto;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(info(
    title = "Taskmaster API",
    description = "Personal and team task tracking with projects, members and an activity feed"
))]
struct TaskmasterApi;

/// Constructs the route on the API that renders the swagger UI and returns the OpenAPI schema.
/// Merges in OpenAPI definitions from other locations in the app, such as the [dto] package
/// and submodules of [api][crate::api]
pub fn build_documentation() -> SwaggerUi {
    let mut api_docs = TaskmasterApi::openapi();
    api_docs.merge(dto::OpenApiSchemas::openapi());
    api_docs.merge(super::auth::AuthApi::openapi());
    api_docs.merge(super::user::UsersApi::openapi());
    api_docs.merge(super::task::TaskApi::openapi());
    api_docs.merge(super::project::ProjectApi::openapi());
    api_docs.merge(super::activity::ActivityApi::openapi());

    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api_docs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_api_is_documented() {
        let mut api_docs = TaskmasterApi::openapi();
        api_docs.merge(super::super::auth::AuthApi::openapi());
        api_docs.merge(super::super::task::TaskApi::openapi());
        api_docs.merge(super::super::project::ProjectApi::openapi());
        api_docs.merge(super::super::activity::ActivityApi::openapi());

        for path in [
            "/api/auth/login",
            "/api/tasks/{task_id}/restore",
            "/api/projects/{project_id}/members/{member_id}",
            "/api/activities",
        ] {
            assert!(
                api_docs.paths.paths.contains_key(path),
                "{path} is missing from the docs"
            );
        }
    }
}
