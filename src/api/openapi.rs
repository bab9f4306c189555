//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, items, loans, requests, social};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shelfmark API",
        version = "1.0.0",
        description = "Community library REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Shelfmark Team", email = "contact@shelfmark.org")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::signup,
        auth::activate,
        auth::login,
        auth::me,
        auth::update_profile,
        auth::set_role,
        auth::set_status,
        // Catalog
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::list_authors,
        books::create_author,
        books::update_author,
        books::delete_author,
        books::list_publishers,
        books::create_publisher,
        books::update_publisher,
        books::delete_publisher,
        books::list_categories,
        books::create_category,
        books::update_category,
        books::delete_category,
        // Items
        items::list_items,
        items::create_item,
        items::update_item,
        items::delete_item,
        // Requests
        requests::submit_request,
        requests::list_requests,
        requests::get_request,
        requests::approve_request,
        requests::reject_request,
        requests::cancel_request,
        requests::request_mails,
        // Loans
        loans::return_loan,
        loans::request_loans,
        loans::user_loans,
        // Social
        social::add_favorite,
        social::remove_favorite,
        social::list_favorites,
        social::follow_author,
        social::unfollow_author,
        social::follow_publisher,
        social::unfollow_publisher,
        social::add_comment,
        social::list_comments,
        social::delete_comment,
        social::rate_book,
        social::book_ratings,
    ),
    components(
        schemas(
            // Auth
            auth::SignupResponse,
            auth::SetRole,
            auth::SetStatus,
            crate::models::user::Signup,
            crate::models::user::Login,
            crate::models::user::LoginResponse,
            crate::models::user::Me,
            crate::models::user::MemberProfile,
            crate::models::user::UpdateProfile,
            // Catalog
            crate::models::book::Author,
            crate::models::book::CreateAuthor,
            crate::models::book::UpdateAuthor,
            crate::models::book::Publisher,
            crate::models::book::CreatePublisher,
            crate::models::book::UpdatePublisher,
            crate::models::book::Category,
            crate::models::book::CreateCategory,
            crate::models::book::UpdateCategory,
            crate::models::book::Book,
            crate::models::book::BookDetails,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::BookQuery,
            crate::models::book::BookList,
            // Items
            crate::models::item::BookItem,
            crate::models::item::CreateBookItem,
            crate::models::item::UpdateBookItem,
            // Requests
            crate::models::request::BorrowRequest,
            crate::models::request::BorrowRequestItem,
            crate::models::request::BorrowRequestDetails,
            crate::models::request::RequestLine,
            crate::models::request::SubmitRequest,
            crate::models::request::RejectRequest,
            crate::models::request::ApprovalOutcome,
            requests::RequestList,
            crate::models::mail::MailReference,
            crate::models::mail::MailQueueEntry,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::ReturnLoan,
            // Social
            crate::models::social::UserFavorite,
            crate::models::social::FollowAuthor,
            crate::models::social::FollowPublisher,
            crate::models::social::BookComment,
            crate::models::social::CreateComment,
            crate::models::social::BookRating,
            crate::models::social::RateBook,
            social::RatingList,
            // Enums
            crate::models::enums::RequestStatus,
            crate::models::enums::ItemStatus,
            crate::models::enums::LoanStatus,
            crate::models::enums::ReturnCondition,
            crate::models::enums::Role,
            crate::models::enums::ProfileStatus,
            crate::models::enums::MailType,
            crate::models::enums::MailStatus,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Accounts and authentication"),
        (name = "catalog", description = "Books, authors, publishers, categories and physical copies"),
        (name = "requests", description = "Borrow request lifecycle"),
        (name = "loans", description = "Loan management"),
        (name = "social", description = "Favorites, follows, comments and ratings")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
