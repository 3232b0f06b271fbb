//! View models behind each screen.
//!
//! Pages read the collection stores only; nothing here talks to the backend.

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use super::{parse_id, success, ApiResult};
use crate::errors::AppError;
use crate::models::{Cookbook, Recipe, User, UserStats};
use crate::store::{CollectionStore, Record, StoreState};
use crate::AppState;

/// How many items the home page shows per shelf.
pub const HOME_SHELF_SIZE: usize = 4;

/// Descriptor for the public login and register screens.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPageView {
    pub page: &'static str,
    pub signed_in: bool,
    /// Set when the visitor already has a session and should skip the form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub greeting: String,
    pub stats: UserStats,
    pub recent_cookbooks: Vec<Cookbook>,
    pub recent_recipes: Vec<Recipe>,
    pub favorite_cookbooks: Vec<Cookbook>,
    pub favorite_recipes: Vec<Recipe>,
    pub loading: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesView {
    pub cookbooks: Vec<Cookbook>,
    pub recipes: Vec<Recipe>,
    pub loading: bool,
}

/// A searchable list screen.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView<R: Serialize> {
    pub query: String,
    pub items: Vec<R>,
    /// Size of the whole collection, before filtering.
    pub total: usize,
    pub state: StoreState,
}

/// An edit screen: the stored record and the form prefilled from it.
#[derive(Serialize)]
pub struct EditView<R: Record> {
    pub record: R,
    pub form: R::Input,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub user: User,
    pub stats: UserStats,
    pub total_favorites: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// GET /login
pub async fn login_page(State(state): State<AppState>) -> ApiResult<AuthPageView> {
    success(auth_page("login", &state))
}

/// GET /register
pub async fn register_page(State(state): State<AppState>) -> ApiResult<AuthPageView> {
    success(auth_page("register", &state))
}

fn auth_page(page: &'static str, state: &AppState) -> AuthPageView {
    let signed_in = state.session.is_signed_in();
    AuthPageView {
        page,
        signed_in,
        redirect: signed_in.then_some("/"),
    }
}

/// GET / - Greeting, counts, newest items and favorites.
pub async fn home_page(State(state): State<AppState>) -> ApiResult<HomeView> {
    let user = current_user(&state)?;
    let stats = user_stats(&state).await;

    let cookbooks = state.cookbooks.list().await;
    let recipes = state.recipes.list().await;

    success(HomeView {
        greeting: format!("Welcome back, {}", user.greeting_name()),
        stats,
        recent_cookbooks: newest(&cookbooks),
        recent_recipes: newest(&recipes),
        favorite_cookbooks: shelf(state.cookbooks.favorites().await),
        favorite_recipes: shelf(state.recipes.favorites().await),
        loading: state.cookbooks.is_loading() || state.recipes.is_loading(),
    })
}

/// GET /favorites
pub async fn favorites_page(State(state): State<AppState>) -> ApiResult<FavoritesView> {
    success(FavoritesView {
        cookbooks: state.cookbooks.favorites().await,
        recipes: state.recipes.favorites().await,
        loading: state.cookbooks.is_loading() || state.recipes.is_loading(),
    })
}

/// GET /cookbooks?q=
pub async fn cookbooks_page(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<ListView<Cookbook>> {
    success(list_view(&state.cookbooks, query).await)
}

/// GET /recipes?q=
pub async fn recipes_page(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<ListView<Recipe>> {
    success(list_view(&state.recipes, query).await)
}

/// GET /cookbook/{id}
pub async fn cookbook_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Cookbook> {
    success(find(&state.cookbooks, &id).await?)
}

/// GET /cookbook/{id}/edit
pub async fn cookbook_edit_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<EditView<Cookbook>> {
    success(edit_view(find(&state.cookbooks, &id).await?))
}

/// GET /recipe/{id}
pub async fn recipe_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Recipe> {
    success(find(&state.recipes, &id).await?)
}

/// GET /recipe/{id}/edit
pub async fn recipe_edit_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<EditView<Recipe>> {
    success(edit_view(find(&state.recipes, &id).await?))
}

/// GET /profile
pub async fn profile_page(State(state): State<AppState>) -> ApiResult<ProfileView> {
    let user = current_user(&state)?;
    let stats = user_stats(&state).await;
    success(ProfileView {
        user,
        total_favorites: stats.total_favorites(),
        stats,
    })
}

/// Counts across both collections.
pub async fn user_stats(state: &AppState) -> UserStats {
    UserStats {
        total_cookbooks: state.cookbooks.len().await,
        favorite_cookbooks: state.cookbooks.favorite_count().await,
        total_recipes: state.recipes.len().await,
        favorite_recipes: state.recipes.favorite_count().await,
    }
}

fn current_user(state: &AppState) -> Result<User, AppError> {
    state
        .session
        .user()
        .ok_or_else(|| AppError::Unauthorized("Sign in required".to_string()))
}

/// The newest items; lists are kept newest first.
fn newest<R: Clone>(items: &[R]) -> Vec<R> {
    items.iter().take(HOME_SHELF_SIZE).cloned().collect()
}

fn shelf<R>(mut items: Vec<R>) -> Vec<R> {
    items.truncate(HOME_SHELF_SIZE);
    items
}

async fn list_view<R: Record>(store: &CollectionStore<R>, query: SearchQuery) -> ListView<R> {
    let query = query.q.unwrap_or_default();
    ListView {
        items: store.search(&query).await,
        total: store.len().await,
        state: store.state(),
        query,
    }
}

async fn find<R: Record>(store: &CollectionStore<R>, raw_id: &str) -> Result<R, AppError> {
    let id = parse_id(raw_id)?;
    store
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", R::LABEL, id)))
}

fn edit_view<R: Record>(record: R) -> EditView<R> {
    EditView {
        form: record.changes(),
        record,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_takes_head_of_newest_first_list() {
        let items = vec![6, 5, 4, 3, 2, 1];
        assert_eq!(newest(&items), vec![6, 5, 4, 3]);
        assert_eq!(newest(&items[..2]), vec![6, 5]);
    }

    #[test]
    fn test_shelf_caps_size() {
        assert_eq!(shelf(vec![1, 2, 3, 4, 5]), vec![1, 2, 3, 4]);
        assert!(shelf(Vec::<i32>::new()).is_empty());
    }
}
