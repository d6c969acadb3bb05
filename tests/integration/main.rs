mod api_test;
mod auth_test;
mod helpers;
mod profile_test;
mod room_test;
