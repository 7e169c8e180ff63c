pub mod invitation_handlers;
pub mod rsvp_handlers;
