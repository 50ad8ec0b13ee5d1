//! Page objects for the feedback portal used as the reference application:
//! a tenant home page with an idea list, idea detail pages and the OAuth
//! provider sign-in pages the home page hands over to.

mod home;
mod idea_list;
mod show_idea;
mod sign_in;

pub use home::HomePage;
pub use idea_list::{IdeaList, IdeaListItem};
pub use show_idea::ShowIdeaPage;
pub use sign_in::{FacebookSignInPage, GoogleSignInPage};
