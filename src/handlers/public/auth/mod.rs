// handlers/public/auth/mod.rs - Google sign-in flow
//
// Issues the consent URL, completes the authorization-code exchange and
// mints the JWT used on every protected route.

pub mod callback; // GET /api/auth/callback
pub mod login;    // GET /api/auth/login
pub mod logout;   // POST /api/auth/logout

pub use callback::callback;
pub use login::login;
pub use logout::logout;
