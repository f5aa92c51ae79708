use serde::de::DeserializeOwned;
use serde::Serialize;
use worker::*;

mod config;
mod db;
mod error;
mod forks;
mod listing;
mod models;
mod stars;

use config::Config;
use error::{ApiError, ApiResult};
use forks::FORKS_FAILED;
use listing::LIST_FAILED;
use stars::STARS_FAILED;

const GET_FAILED: &str = "Failed to fetch agent";
const CREATE_FAILED: &str = "Failed to create agent";
const DELETE_FAILED: &str = "Failed to delete agent";

#[event(fetch)]
pub async fn fetch(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    console_error_panic_hook::set_once();

    let config = Config::from_env(&env);
    let router = Router::with_data(config);

    router
        // health
        .get("/", |_, _| Response::ok("subnet-worker online"))
        .get("/health", |_, ctx| {
            Response::from_json(&models::HealthResponse {
                service: &ctx.data.service_name,
                status: "ok",
            })
        })
        // tool catalog
        .get("/tools", |_, _| Response::from_json(&models::AVAILABLE_TOOLS))
        // agents
        .get_async("/agents", list_agents)
        .post_async("/agents", create_agent)
        .patch_async("/agents", set_stars)
        .get_async("/agents/:id", get_agent)
        .delete_async("/agents/:id", delete_agent)
        // forks + stars
        .get_async("/agents/:id/forks", get_forks)
        .post_async("/agents/:id/stars", adjust_stars)
        .run(req, env)
        .await
}

async fn list_agents(req: Request, ctx: RouteContext<Config>) -> Result<Response> {
    finish(
        async {
            let url = req.url().map_err(ApiError::internal(LIST_FAILED))?;
            let sort = url
                .query_pairs()
                .find(|(k, _)| k == "sort")
                .map(|(_, v)| v.into_owned());
            let order = listing::SortOrder::parse(sort.as_deref())?;
            let d1 = database(&ctx, LIST_FAILED)?;
            let agents = listing::list_agents(&d1, order, ctx.data.list_limit).await?;
            json(&agents, 200)
        }
        .await,
    )
}

async fn create_agent(mut req: Request, ctx: RouteContext<Config>) -> Result<Response> {
    finish(
        async {
            let body: models::CreateAgent = read_json(&mut req).await?;
            let new_agent = body.validate()?;
            let d1 = database(&ctx, CREATE_FAILED)?;
            let agent = db::insert_agent(&d1, &new_agent)
                .await
                .map_err(ApiError::internal(CREATE_FAILED))?;
            console_log!(
                "agent created id={} fork_of={:?}",
                agent.id,
                agent.original_agent_id
            );
            json(&agent.into_summary(0), 201)
        }
        .await,
    )
}

async fn get_agent(_req: Request, ctx: RouteContext<Config>) -> Result<Response> {
    finish(
        async {
            let id = path_id(&ctx)?;
            let d1 = database(&ctx, GET_FAILED)?;
            let agent = db::get_agent(&d1, id)
                .await
                .map_err(ApiError::internal(GET_FAILED))?
                .ok_or_else(ApiError::not_found)?;
            let forks = db::count_forks(&d1, id)
                .await
                .map_err(ApiError::internal(GET_FAILED))?;
            json(&agent.into_summary(forks), 200)
        }
        .await,
    )
}

async fn delete_agent(_req: Request, ctx: RouteContext<Config>) -> Result<Response> {
    finish(
        async {
            let id = path_id(&ctx)?;
            let d1 = database(&ctx, DELETE_FAILED)?;
            let deleted = db::delete_agent(&d1, id)
                .await
                .map_err(ApiError::internal(DELETE_FAILED))?;
            if !deleted {
                return Err(ApiError::not_found());
            }
            console_log!("agent deleted id={id}");
            json(
                &models::AgentDeleted {
                    id: id.to_string(),
                    deleted: true,
                },
                200,
            )
        }
        .await,
    )
}

async fn get_forks(_req: Request, ctx: RouteContext<Config>) -> Result<Response> {
    finish(
        async {
            let id = path_id(&ctx)?;
            let d1 = database(&ctx, FORKS_FAILED)?;
            let info = forks::resolve(&d1, id).await?;
            json(&info, 200)
        }
        .await,
    )
}

async fn set_stars(mut req: Request, ctx: RouteContext<Config>) -> Result<Response> {
    finish(
        async {
            let body: models::UpdateStars = read_json(&mut req).await?;
            let d1 = database(&ctx, STARS_FAILED)?;
            let updated = stars::set_stars(&d1, &body).await?;
            json(&updated, 200)
        }
        .await,
    )
}

async fn adjust_stars(mut req: Request, ctx: RouteContext<Config>) -> Result<Response> {
    finish(
        async {
            let id = path_id(&ctx)?;
            let body: models::AdjustStars = read_json(&mut req).await?;
            let d1 = database(&ctx, STARS_FAILED)?;
            let updated = stars::adjust_stars(&d1, id, &body).await?;
            json(&updated, 200)
        }
        .await,
    )
}

// ── Helpers ─────────────────────────────────────────────────────

fn finish(result: ApiResult<Response>) -> Result<Response> {
    match result {
        Ok(resp) => Ok(resp),
        Err(err) => err.into_response(&generate_request_id()?),
    }
}

fn json<T: Serialize>(value: &T, status: u16) -> ApiResult<Response> {
    Response::from_json(value)
        .map(|resp| resp.with_status(status))
        .map_err(ApiError::internal("Failed to encode response"))
}

async fn read_json<T: DeserializeOwned>(req: &mut Request) -> ApiResult<T> {
    req.json()
        .await
        .map_err(|e| ApiError::Validation(format!("invalid JSON body: {e}")))
}

fn path_id(ctx: &RouteContext<Config>) -> ApiResult<i64> {
    let raw = ctx
        .param("id")
        .ok_or_else(|| ApiError::Validation("Invalid agent ID".into()))?;
    models::parse_agent_id(raw)
}

fn database(ctx: &RouteContext<Config>, context: &'static str) -> ApiResult<D1Database> {
    ctx.d1(config::DB_BINDING)
        .map_err(ApiError::internal(context))
}

fn generate_request_id() -> Result<String> {
    let mut buf = [0u8; 16];
    getrandom::getrandom(&mut buf)
        .map_err(|err| Error::RustError(format!("failed to generate request id: {err}")))?;
    Ok(hex::encode(buf))
}
