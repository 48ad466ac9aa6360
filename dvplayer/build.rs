include!("../build/shared_git_metadata.rs");

fn main() {
    emit_git_metadata();
}
