mod save_service_tests;
