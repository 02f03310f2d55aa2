mod bring_up;
mod console_flow;
mod recorder;
mod recovery;
