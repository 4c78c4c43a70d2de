pub mod socketio;
