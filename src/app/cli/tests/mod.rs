mod args_tests;
