mod helpers;
mod test_release;
