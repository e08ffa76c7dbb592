pub mod wheel_canvas;
