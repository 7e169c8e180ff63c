mod rsvp_handlers_test;
