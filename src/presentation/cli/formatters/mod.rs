pub mod plugin_fmt;
