pub mod push_listener;
