mod api_tests;
mod repository_tests;
